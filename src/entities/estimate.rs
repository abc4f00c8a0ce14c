use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Route, RouteRequest};
use crate::error::{invalid_invocation_error, invalid_state_error, Error};

// Every address edit bumps the generation counter, and a resolution attempt
// may only deliver its outcome while its generation is still current.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Uuid,
    pub status: Status,
    pub request: Option<RouteRequest>,
    pub return_trip: bool,
    pub generation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Empty,
    AddressesEntered,
    Resolving {
        generation: i64,
        started_at: DateTime<Utc>,
    },
    Resolved {
        route: Route,
        resolved_at: DateTime<Utc>,
    },
    Failed {
        code: i32,
        message: String,
        failed_at: DateTime<Utc>,
    },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Empty => "empty".into(),
            Self::AddressesEntered => "addresses_entered".into(),
            Self::Resolving { .. } => "resolving".into(),
            Self::Resolved { .. } => "resolved".into(),
            Self::Failed { .. } => "failed".into(),
        }
    }
}

impl Estimate {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: Status::Empty,
            request: None,
            return_trip: false,
            generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // Any previous outcome is stale from this point on, including one still
    // being resolved.
    pub fn set_addresses(&mut self, request: RouteRequest) {
        self.request = Some(request);
        self.generation += 1;
        self.status = Status::AddressesEntered;
        self.updated_at = Utc::now();
    }

    pub fn set_return_trip(&mut self, return_trip: bool) {
        self.return_trip = return_trip;
        self.updated_at = Utc::now();
    }

    // At most one attempt may be in flight; the returned token must be
    // presented with the outcome.
    pub fn begin_resolution(&mut self) -> Result<i64, Error> {
        match self.status {
            Status::Empty => Err(invalid_state_error()),
            Status::Resolving { .. } => Err(invalid_invocation_error()),
            _ => {
                if self.request.is_none() {
                    return Err(invalid_state_error());
                }
                self.status = Status::Resolving {
                    generation: self.generation,
                    started_at: Utc::now(),
                };
                self.updated_at = Utc::now();
                Ok(self.generation)
            }
        }
    }

    // Returns whether the outcome was applied; a stale token is dropped
    // without effect.
    pub fn complete_resolution(&mut self, token: i64, route: Route) -> bool {
        if !self.accepts_outcome(token) {
            return false;
        }
        self.status = Status::Resolved {
            route,
            resolved_at: Utc::now(),
        };
        self.updated_at = Utc::now();
        true
    }

    // same staleness rule as completion
    pub fn fail_resolution(&mut self, token: i64, code: i32, message: String) -> bool {
        if !self.accepts_outcome(token) {
            return false;
        }
        self.status = Status::Failed {
            code,
            message,
            failed_at: Utc::now(),
        };
        self.updated_at = Utc::now();
        true
    }

    fn accepts_outcome(&self, token: i64) -> bool {
        match self.status {
            Status::Resolving { generation, .. } => {
                generation == token && token == self.generation
            }
            _ => false,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.status, Status::Resolving { .. })
    }

    pub fn resolved_route(&self) -> Option<&Route> {
        match &self.status {
            Status::Resolved { route, .. } => Some(route),
            _ => None,
        }
    }

    // route geometry never goes to storage
    pub fn strip_route_path(&mut self) {
        if let Status::Resolved { route, .. } = &mut self.status {
            route.path = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Coordinates, Leg, Place};

    fn request(pickup: &str, dropoff: &str) -> RouteRequest {
        RouteRequest::new(pickup.into(), dropoff.into(), None).unwrap()
    }

    fn route(request: RouteRequest) -> Route {
        let stops = request
            .stops()
            .iter()
            .map(|stop| Place::new(Coordinates { lat: 46.09, lng: -64.78 }, stop.to_string()))
            .collect();
        Route::new(
            request,
            stops,
            vec![Leg {
                start_address: "A".into(),
                end_address: "B".into(),
                distance_km: 12.3,
                duration_min: 17,
            }],
            12.3,
            17,
            false,
            None,
        )
    }

    #[test]
    fn resolution_needs_addresses() {
        let mut estimate = Estimate::new();

        assert!(estimate.begin_resolution().is_err());

        estimate.set_addresses(request("86 Botsford St", "777 Main St"));
        assert!(estimate.begin_resolution().is_ok());
    }

    #[test]
    fn only_one_attempt_may_be_in_flight() {
        let mut estimate = Estimate::new();
        estimate.set_addresses(request("86 Botsford St", "777 Main St"));

        estimate.begin_resolution().unwrap();
        assert!(estimate.begin_resolution().is_err());
    }

    #[test]
    fn current_attempt_delivers_its_route() {
        let mut estimate = Estimate::new();
        let req = request("86 Botsford St", "777 Main St");
        estimate.set_addresses(req.clone());

        let token = estimate.begin_resolution().unwrap();
        assert!(estimate.complete_resolution(token, route(req)));
        assert!(estimate.resolved_route().is_some());
    }

    #[test]
    fn editing_addresses_invalidates_an_attempt_in_flight() {
        let mut estimate = Estimate::new();
        let req = request("86 Botsford St", "777 Main St");
        estimate.set_addresses(req.clone());
        let token = estimate.begin_resolution().unwrap();

        estimate.set_addresses(request("86 Botsford St", "100 Elm St"));

        assert!(!estimate.complete_resolution(token, route(req)));
        assert!(estimate.resolved_route().is_none());
        assert_eq!(estimate.status.name(), "addresses_entered");
    }

    #[test]
    fn editing_addresses_clears_a_previous_outcome() {
        let mut estimate = Estimate::new();
        let req = request("86 Botsford St", "777 Main St");
        estimate.set_addresses(req.clone());
        let token = estimate.begin_resolution().unwrap();
        estimate.complete_resolution(token, route(req));

        estimate.set_addresses(request("86 Botsford St", "100 Elm St"));

        assert!(estimate.resolved_route().is_none());
    }

    #[test]
    fn stale_failure_is_dropped() {
        let mut estimate = Estimate::new();
        estimate.set_addresses(request("86 Botsford St", "777 Main St"));
        let token = estimate.begin_resolution().unwrap();

        estimate.set_addresses(request("86 Botsford St", "100 Elm St"));

        assert!(!estimate.fail_resolution(token, 200, "no route".into()));
        assert_eq!(estimate.status.name(), "addresses_entered");
    }

    #[test]
    fn failed_estimates_can_be_retried() {
        let mut estimate = Estimate::new();
        estimate.set_addresses(request("86 Botsford St", "777 Main St"));
        let token = estimate.begin_resolution().unwrap();
        assert!(estimate.fail_resolution(token, 200, "no route".into()));
        assert!(estimate.resolved_route().is_none());

        assert!(estimate.begin_resolution().is_ok());
    }
}
