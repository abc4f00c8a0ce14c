pub mod access_requests;
pub mod bookings;
pub mod estimates;
pub mod places;
pub mod quotes;
pub mod settings;
