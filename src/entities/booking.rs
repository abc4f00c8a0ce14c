use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Quote;
use crate::validation::BookingDetails;

// Only ever constructed from details that passed validation, so the contact
// fields are already normalized.
#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct Booking {
    #[polar(attribute)]
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub passengers: i64,
    pub return_trip: bool,
    pub message: String,
    pub quote: Quote,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(details: BookingDetails, quote: Quote) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name: details.name,
            email: details.email,
            phone: details.phone,
            pickup_date: details.pickup_date,
            pickup_time: details.pickup_time,
            return_date: details.return_date,
            return_time: details.return_time,
            passengers: details.passengers,
            return_trip: details.return_trip,
            message: details.message,
            quote,
            created_at: Utc::now(),
        }
    }
}
