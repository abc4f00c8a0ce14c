use geo_types::LineString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Place;
use crate::error::{invalid_input_error, Error};

// The addresses a caller wants routed, in visiting order. Construction
// trims the inputs and rejects blank mandatory stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub pickup: String,
    pub dropoff: String,
    pub second_dropoff: Option<String>,
}

impl RouteRequest {
    pub fn new(
        pickup: String,
        dropoff: String,
        second_dropoff: Option<String>,
    ) -> Result<Self, Error> {
        let pickup = pickup.trim().to_string();
        let dropoff = dropoff.trim().to_string();
        let second_dropoff = second_dropoff
            .map(|stop| stop.trim().to_string())
            .filter(|stop| !stop.is_empty());

        if pickup.is_empty() || dropoff.is_empty() {
            return Err(invalid_input_error());
        }

        Ok(Self {
            pickup,
            dropoff,
            second_dropoff,
        })
    }

    pub fn is_multi_stop(&self) -> bool {
        self.second_dropoff.is_some()
    }

    pub fn stops(&self) -> Vec<&str> {
        let mut stops = vec![self.pickup.as_str(), self.dropoff.as_str()];
        if let Some(second) = &self.second_dropoff {
            stops.push(second.as_str());
        }
        stops
    }
}

// One driven segment between two consecutive stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub start_address: String,
    pub end_address: String,
    pub distance_km: f64,
    pub duration_min: i64,
}

// Totals are derived from the raw provider measurements of every leg, not
// from the rounded per-leg figures.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub token: Uuid,
    pub request: RouteRequest,
    pub stops: Vec<Place>,
    pub legs: Vec<Leg>,
    pub distance_km: f64,
    pub duration_min: i64,
    // set when a multi-stop request had to fall back to its first leg
    pub degraded: bool,
    // overview geometry for rendering, never persisted
    pub path: Option<LineString<f64>>,
}

impl Route {
    pub fn new(
        request: RouteRequest,
        stops: Vec<Place>,
        legs: Vec<Leg>,
        distance_km: f64,
        duration_min: i64,
        degraded: bool,
        path: Option<LineString<f64>>,
    ) -> Self {
        Self {
            token: Uuid::new_v4(),
            request,
            stops,
            legs,
            distance_km,
            duration_min,
            degraded,
            path,
        }
    }

    // a copy suitable for storage, with the provider-owned geometry dropped
    pub fn without_path(&self) -> Self {
        let mut route = self.clone();
        route.path = None;
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_addresses_are_rejected() {
        assert!(RouteRequest::new("".into(), "86 Botsford St".into(), None).is_err());
        assert!(RouteRequest::new("86 Botsford St".into(), "   ".into(), None).is_err());
    }

    #[test]
    fn blank_second_stop_collapses_to_single() {
        let request = RouteRequest::new(
            "86 Botsford St, Moncton".into(),
            "777 Main St, Moncton".into(),
            Some("  ".into()),
        )
        .unwrap();

        assert!(!request.is_multi_stop());
        assert_eq!(request.stops().len(), 2);
    }

    #[test]
    fn stops_keep_visiting_order() {
        let request = RouteRequest::new(
            "A".into(),
            "B".into(),
            Some("C".into()),
        )
        .unwrap();

        assert_eq!(request.stops(), vec!["A", "B", "C"]);
    }
}
