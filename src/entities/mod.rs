mod access_request;
mod booking;
mod estimate;
mod place;
mod quote;
mod route;
mod settings;

pub use access_request::{AccessDecision, AccessRequest};
pub use booking::Booking;
pub use estimate::Estimate;
pub use place::{Coordinates, Place};
pub use quote::Quote;
pub use route::{Leg, Route, RouteRequest};
pub use settings::FareSettings;
