use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{FareSettings, Route};

// Snapshots the settings in force at pricing time alongside the amount;
// history entries must stay explainable after the rates change.
#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct Quote {
    #[polar(attribute)]
    pub token: Uuid,
    pub route: Route,
    pub settings: FareSettings,
    pub return_trip: bool,
    pub amount: f64,
    pub currency: String,
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(route: Route, settings: FareSettings, return_trip: bool, requested_by: Uuid) -> Self {
        let amount = settings.quote_amount(route.distance_km, return_trip);
        let currency = settings.currency.clone();
        Self {
            token: Uuid::new_v4(),
            route,
            settings,
            return_trip,
            amount,
            currency,
            requested_by,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Coordinates, Leg, Place, RouteRequest};

    fn route(distance_km: f64) -> Route {
        let request = RouteRequest::new("A".into(), "B".into(), None).unwrap();
        Route::new(
            request,
            vec![
                Place::new(Coordinates { lat: 46.09, lng: -64.78 }, "A".into()),
                Place::new(Coordinates { lat: 46.11, lng: -64.80 }, "B".into()),
            ],
            vec![Leg {
                start_address: "A".into(),
                end_address: "B".into(),
                distance_km,
                duration_min: 20,
            }],
            distance_km,
            20,
            false,
            None,
        )
    }

    #[test]
    fn amount_follows_the_settings_in_force() {
        let quote = Quote::new(route(20.0), FareSettings::default(), false, Uuid::new_v4());

        assert_eq!(quote.amount, 36.00);
        assert_eq!(quote.currency, "CAD");
    }

    #[test]
    fn return_trips_are_priced_both_ways() {
        let quote = Quote::new(route(20.0), FareSettings::default(), true, Uuid::new_v4());

        assert_eq!(quote.amount, 72.00);
    }
}
