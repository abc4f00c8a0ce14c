use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

// The camelCase keys are the ones the settings document has always been
// stored under; existing rows must keep deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareSettings {
    pub per_km_rate: f64,
    pub base_fare: f64,
    pub min_fare: f64,
    pub currency: String,
}

impl Default for FareSettings {
    fn default() -> Self {
        Self {
            per_km_rate: 1.65,
            base_fare: 3.00,
            min_fare: 25.00,
            currency: "CAD".into(),
        }
    }
}

impl FareSettings {
    pub fn validate(&self) -> Result<(), Error> {
        let amounts_valid = [self.per_km_rate, self.base_fare, self.min_fare]
            .iter()
            .all(|amount| amount.is_finite() && *amount >= 0.0);

        if amounts_valid && !self.currency.trim().is_empty() {
            Ok(())
        } else {
            Err(invalid_input_error())
        }
    }

    // the minimum fare floors the linear formula
    pub fn fare(&self, distance_km: f64) -> f64 {
        let metered = self.base_fare + self.per_km_rate * distance_km;
        if metered < self.min_fare {
            self.min_fare
        } else {
            metered
        }
    }

    // return trips double the fare after the floor is applied
    pub fn quote_amount(&self, distance_km: f64, return_trip: bool) -> f64 {
        let one_way = self.fare(distance_km);
        if return_trip {
            one_way * 2.0
        } else {
            one_way
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_trips_pay_the_minimum_fare() {
        let settings = FareSettings::default();

        // 3.00 + 1.65 * 10 = 19.50, floored to 25.00
        assert_eq!(settings.fare(10.0), 25.00);
        assert_eq!(settings.fare(0.0), 25.00);
    }

    #[test]
    fn long_trips_pay_the_metered_fare() {
        let settings = FareSettings::default();

        // 3.00 + 1.65 * 20 = 36.00
        assert_eq!(settings.fare(20.0), 36.00);
    }

    #[test]
    fn return_trips_double_the_floored_fare() {
        let settings = FareSettings::default();

        assert_eq!(settings.quote_amount(20.0, true), 72.00);
        // A short hop doubles the floor, not the metered 19.50.
        assert_eq!(settings.quote_amount(10.0, true), 50.00);
    }

    #[test]
    fn fares_never_decrease_with_distance() {
        let settings = FareSettings::default();

        let mut previous = settings.fare(0.0);
        for tenths in 1..400 {
            let fare = settings.fare(tenths as f64 / 10.0);
            assert!(fare >= previous);
            previous = fare;
        }
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut settings = FareSettings::default();
        settings.min_fare = -1.0;

        assert!(settings.validate().is_err());

        settings.min_fare = 25.0;
        settings.currency = "  ".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn stored_keys_stay_camel_case() {
        let json = serde_json::to_value(FareSettings::default()).unwrap();

        assert!(json.get("perKmRate").is_some());
        assert!(json.get("baseFare").is_some());
        assert!(json.get("minFare").is_some());
    }
}
