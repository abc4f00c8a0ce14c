use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::Coordinates,
    error::{
        invalid_input_error, malformed_request_error, no_route_error, permission_denied_error,
        rate_limited_error, upstream_route_error, Error,
    },
};

// Statuses the provider introduces later land on Unknown rather than
// failing deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    pub fn as_error(self) -> Error {
        match self {
            Status::ZeroResults => no_route_error(),
            Status::OverQueryLimit => rate_limited_error(),
            Status::RequestDenied => permission_denied_error(),
            Status::InvalidRequest => malformed_request_error(),
            Status::Ok | Status::Unknown => upstream_route_error(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectionsRoute {
    pub legs: Vec<DirectionsLeg>,
    pub overview_polyline: OverviewPolyline,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectionsLeg {
    pub start_address: String,
    pub end_address: String,
    pub distance: Measurement,
    pub duration: Measurement,
}

// The provider sends each measurement as a display string plus a raw value
// (meters or seconds). Only the raw value is trusted for arithmetic.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Measurement {
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OverviewPolyline {
    pub points: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
}

pub type PlaceSuggestions = Vec<PlaceSuggestion>;

#[derive(Clone, Debug, Deserialize)]
struct Response<T> {
    status: Status,
    results: Option<T>,
    routes: Option<T>,
    predictions: Option<T>,
}

#[tracing::instrument]
pub async fn geocode(address: &str) -> Result<GeocodeResult, Error> {
    let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
    let url = format!("https://{}/maps/api/geocode/json", api_base);
    let key = env::var("GOOGLE_MAPS_API_KEY")?;

    let res = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&[("address", address)])
        .send()
        .await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_route_error());
    }

    let data: Response<Vec<GeocodeResult>> = res.json().await?;

    if !data.status.is_ok() {
        return Err(data.status.as_error());
    }

    data.results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(upstream_route_error)
}

#[tracing::instrument]
pub async fn directions(
    origin: String,
    destination: String,
    waypoints: Vec<String>,
) -> Result<DirectionsRoute, Error> {
    let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
    let url = format!("https://{}/maps/api/directions/json", api_base);
    let key = env::var("GOOGLE_MAPS_API_KEY")?;

    let res = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&route_query(origin, destination, waypoints))
        .send()
        .await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_route_error());
    }

    let data: Response<Vec<DirectionsRoute>> = res.json().await?;

    if !data.status.is_ok() {
        return Err(data.status.as_error());
    }

    data.routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or_else(upstream_route_error)
}

// Waypoints are passed in visiting order and the provider is never allowed
// to reorder them.
fn route_query(
    origin: String,
    destination: String,
    waypoints: Vec<String>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("origin", origin),
        ("destination", destination),
        ("mode", "driving".to_string()),
        ("units", "metric".to_string()),
    ];

    if !waypoints.is_empty() {
        query.push(("waypoints", waypoints.join("|")));
    }

    query
}

#[tracing::instrument]
pub async fn find_place_suggestions(
    input: String,
    session_token: String,
) -> Result<PlaceSuggestions, Error> {
    let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
    let url = format!("https://{}/maps/api/place/autocomplete/json", api_base);
    let key = env::var("GOOGLE_MAPS_API_KEY")?;

    let res = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&[("input", input)])
        .query(&[("components", "country:ca".to_string())])
        .query(&[("sessiontoken", session_token)])
        .send()
        .await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_route_error());
    }

    let data: Response<PlaceSuggestions> = res.json().await?;

    match data.status {
        Status::Ok => data.predictions.ok_or_else(upstream_route_error),
        Status::ZeroResults => Ok(data.predictions.unwrap_or_default()),
        other => Err(other.as_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_statuses_deserialize_by_name() {
        let status: Status = serde_json::from_str("\"ZERO_RESULTS\"").unwrap();
        assert_eq!(status, Status::ZeroResults);

        let status: Status = serde_json::from_str("\"OVER_QUERY_LIMIT\"").unwrap();
        assert_eq!(status, Status::OverQueryLimit);
    }

    #[test]
    fn unrecognized_statuses_fall_back_to_unknown() {
        let status: Status = serde_json::from_str("\"MAX_WAYPOINTS_EXCEEDED\"").unwrap();
        assert_eq!(status, Status::Unknown);
    }

    #[test]
    fn each_status_maps_to_its_error_class() {
        assert_eq!(Status::ZeroResults.as_error().code, 200);
        assert_eq!(Status::OverQueryLimit.as_error().code, 201);
        assert_eq!(Status::RequestDenied.as_error().code, 202);
        assert_eq!(Status::InvalidRequest.as_error().code, 203);
        assert_eq!(Status::Unknown.as_error().code, 204);
    }

    #[test]
    fn waypoints_ride_between_origin_and_destination() {
        let query = route_query(
            "46.09,-64.78".into(),
            "46.2,-64.54".into(),
            vec!["46.11,-64.8".into()],
        );

        let waypoints = query.iter().find(|(name, _)| *name == "waypoints");
        assert_eq!(waypoints, Some(&("waypoints", "46.11,-64.8".to_string())));
        assert!(query.iter().all(|(_, value)| !value.contains("optimize")));
    }

    #[test]
    fn single_leg_requests_carry_no_waypoints() {
        let query = route_query("A".into(), "B".into(), vec![]);

        assert!(query.iter().all(|(name, _)| *name != "waypoints"));
    }
}
