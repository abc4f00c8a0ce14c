use super::helpers::{fetch_estimate_for_update, update_estimate};
use super::Engine;

use async_trait::async_trait;
use futures::future::join_all;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::EstimateAPI,
    auth::User,
    entities::{Estimate, Leg, Place, Route, RouteRequest},
    error::{invalid_input_error, invalid_state_error, upstream_route_error, Error},
    external::google_maps,
};

#[async_trait]
impl EstimateAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_estimate(
        &self,
        user: User,
        request: Option<RouteRequest>,
        return_trip: bool,
    ) -> Result<Estimate, Error> {
        let mut estimate = Estimate::new();
        estimate.set_return_trip(return_trip);

        if let Some(request) = request {
            estimate.set_addresses(request);
        }

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO estimates (id, status, data) VALUES ($1, $2, $3)")
                .bind(&estimate.id)
                .bind(estimate.status.name())
                .bind(Json(&estimate)),
        )
        .await?;

        Ok(estimate)
    }

    #[tracing::instrument(skip(self))]
    async fn find_estimate(&self, user: User, id: Uuid) -> Result<Estimate, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM estimates WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(invalid_input_error)?;
        let Json(estimate) = result.try_get("data")?;

        Ok(estimate)
    }

    #[tracing::instrument(skip(self))]
    async fn update_addresses(
        &self,
        user: User,
        id: Uuid,
        request: RouteRequest,
        return_trip: Option<bool>,
    ) -> Result<Estimate, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut estimate = fetch_estimate_for_update(&mut tx, &id).await?;

        // Any previous route is stale from this edit on, including one still
        // being resolved; the generation bump takes care of the latter.
        estimate.set_addresses(request);
        if let Some(return_trip) = return_trip {
            estimate.set_return_trip(return_trip);
        }

        update_estimate(&mut tx, &estimate).await?;
        tx.commit().await?;

        Ok(estimate)
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_estimate(&self, user: User, id: Uuid) -> Result<Estimate, Error> {
        let mut conn = self.pool.acquire().await?;

        // mark the estimate resolving and capture the attempt token
        let mut tx = conn.begin().await?;
        let mut estimate = fetch_estimate_for_update(&mut tx, &id).await?;

        let token = estimate.begin_resolution()?;
        let request = estimate.request.clone().ok_or_else(invalid_state_error)?;

        update_estimate(&mut tx, &estimate).await?;
        tx.commit().await?;

        tracing::info!("estimate marked resolving, querying the provider...");

        // the provider round trip happens outside any transaction
        let outcome = resolve_route(&request).await;

        // deliver the outcome, unless the addresses moved on underneath it
        let mut tx = conn.begin().await?;
        let mut estimate = fetch_estimate_for_update(&mut tx, &id).await?;

        match outcome {
            Ok(route) => {
                if estimate.complete_resolution(token, route) {
                    // the stored copy drops the provider-owned geometry, the
                    // returned one keeps it for rendering
                    let mut stored = estimate.clone();
                    stored.strip_route_path();

                    update_estimate(&mut tx, &stored).await?;
                    tx.commit().await?;

                    tracing::info!("successfully resolved route, returning...");

                    return Ok(estimate);
                }

                tracing::info!("addresses changed during resolution, dropping stale route");
                tx.commit().await?;

                Ok(estimate)
            }
            Err(err) => {
                if estimate.fail_resolution(token, err.code, err.message.clone()) {
                    update_estimate(&mut tx, &estimate).await?;
                    tx.commit().await?;

                    return Err(err);
                }

                tracing::info!("addresses changed during resolution, dropping stale failure");
                tx.commit().await?;

                Ok(estimate)
            }
        }
    }
}

// A multi-stop request that cannot be resolved end to end falls back to its
// first leg instead of failing outright; the result says so.
#[tracing::instrument]
async fn resolve_route(request: &RouteRequest) -> Result<Route, Error> {
    let outcomes = join_all(request.stops().iter().map(|stop| google_maps::geocode(stop))).await;
    let (places, second_dropoff_lost) = collect_places(outcomes)?;

    if !request.is_multi_stop() {
        return route_between(request.clone(), places).await;
    }

    if second_dropoff_lost {
        let mut route = route_between(request.clone(), places).await?;
        route.degraded = true;

        return Ok(route);
    }

    match route_between(request.clone(), places.clone()).await {
        Ok(route) => Ok(route),
        Err(err) => {
            tracing::warn!(
                code = err.code,
                "multi-stop resolution failed, retrying without the second stop"
            );

            let mut remaining = places;
            remaining.truncate(2);

            let mut route = route_between(request.clone(), remaining).await?;
            route.degraded = true;

            Ok(route)
        }
    }
}

// The pickup and first dropoff must geocode; a second dropoff the provider
// cannot place only costs its own leg.
fn collect_places(
    mut outcomes: Vec<Result<google_maps::GeocodeResult, Error>>,
) -> Result<(Vec<Place>, bool), Error> {
    let second_dropoff = if outcomes.len() > 2 { outcomes.pop() } else { None };

    let mut places = Vec::with_capacity(3);
    for outcome in outcomes {
        let result = outcome?;
        places.push(Place::new(result.geometry.location, result.formatted_address));
    }

    match second_dropoff {
        Some(Ok(result)) => {
            places.push(Place::new(result.geometry.location, result.formatted_address));
            Ok((places, false))
        }
        Some(Err(err)) => {
            tracing::warn!(
                code = err.code,
                "second dropoff did not geocode, quoting without it"
            );
            Ok((places, true))
        }
        None => Ok((places, false)),
    }
}

async fn route_between(request: RouteRequest, places: Vec<Place>) -> Result<Route, Error> {
    let (origin, destination, waypoints) = directions_args(&places);
    let directions = google_maps::directions(origin, destination, waypoints).await?;

    assemble_route(request, places, directions)
}

// Callers hold at least the pickup and one dropoff, in visiting order.
fn directions_args(places: &[Place]) -> (String, String, Vec<String>) {
    let coords: Vec<String> = places
        .iter()
        .map(|place| String::from(place.location))
        .collect();

    let origin = coords.first().cloned().unwrap_or_default();
    let destination = coords.last().cloned().unwrap_or_default();
    let waypoints = if coords.len() > 2 {
        coords[1..coords.len() - 1].to_vec()
    } else {
        vec![]
    };

    (origin, destination, waypoints)
}

// Totals come from the raw meter and second sums, not from the rounded
// per-leg figures.
fn assemble_route(
    request: RouteRequest,
    places: Vec<Place>,
    directions: google_maps::DirectionsRoute,
) -> Result<Route, Error> {
    // the provider answers one leg per consecutive pair of stops
    if directions.legs.len() + 1 != places.len() {
        tracing::error!(
            legs = directions.legs.len(),
            stops = places.len(),
            "provider answered with an unexpected leg count"
        );
        return Err(upstream_route_error());
    }

    let mut meters = 0.0;
    let mut seconds = 0.0;
    let mut legs = Vec::with_capacity(directions.legs.len());

    for leg in &directions.legs {
        meters += leg.distance.value;
        seconds += leg.duration.value;

        legs.push(Leg {
            start_address: leg.start_address.clone(),
            end_address: leg.end_address.clone(),
            distance_km: leg.distance.value / 1000.0,
            duration_min: (leg.duration.value / 60.0).round() as i64,
        });
    }

    let path = match polyline::decode_polyline(&directions.overview_polyline.points, 5) {
        Ok(line) => Some(line),
        Err(err) => {
            tracing::warn!(?err, "could not decode the overview polyline");
            None
        }
    };

    Ok(Route::new(
        request,
        places,
        legs,
        meters / 1000.0,
        (seconds / 60.0).round() as i64,
        false,
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Coordinates;
    use crate::error::no_route_error;
    use crate::external::google_maps::{
        DirectionsLeg, DirectionsRoute, GeocodeResult, Geometry, Measurement, OverviewPolyline,
    };

    fn place(lat: f64, lng: f64, address: &str) -> Place {
        Place::new(Coordinates { lat, lng }, address.into())
    }

    fn geocoded(lat: f64, lng: f64, address: &str) -> Result<GeocodeResult, Error> {
        Ok(GeocodeResult {
            formatted_address: address.into(),
            geometry: Geometry {
                location: Coordinates { lat, lng },
            },
        })
    }

    fn leg(from: &str, to: &str, meters: f64, seconds: f64) -> DirectionsLeg {
        DirectionsLeg {
            start_address: from.into(),
            end_address: to.into(),
            distance: Measurement { value: meters },
            duration: Measurement { value: seconds },
        }
    }

    #[test]
    fn waypoints_keep_the_visiting_order() {
        let places = vec![
            place(46.09, -64.78, "A"),
            place(46.11, -64.80, "B"),
            place(46.23, -64.54, "C"),
        ];

        let (origin, destination, waypoints) = directions_args(&places);

        assert_eq!(origin, "46.09,-64.78");
        assert_eq!(waypoints, vec!["46.11,-64.8".to_string()]);
        assert_eq!(destination, "46.23,-64.54");
    }

    #[test]
    fn two_stops_route_without_waypoints() {
        let places = vec![place(46.09, -64.78, "A"), place(46.11, -64.80, "B")];

        let (origin, destination, waypoints) = directions_args(&places);

        assert_eq!(origin, "46.09,-64.78");
        assert_eq!(destination, "46.11,-64.8");
        assert!(waypoints.is_empty());
    }

    #[test]
    fn totals_sum_the_raw_measurements() {
        let request =
            RouteRequest::new("A".into(), "B".into(), Some("C".into())).unwrap();
        let places = vec![
            place(46.09, -64.78, "A"),
            place(46.11, -64.80, "B"),
            place(46.23, -64.54, "C"),
        ];
        let directions = DirectionsRoute {
            legs: vec![leg("A", "B", 8_400.0, 750.0), leg("B", "C", 12_350.0, 1_130.0)],
            overview_polyline: OverviewPolyline { points: "_p~iF~ps|U_ulLnnqC".into() },
        };

        let route = assemble_route(request, places, directions).unwrap();

        assert_eq!(route.distance_km, 20.75);
        // 1880 s = 31.33 min, rounded once over the whole trip
        assert_eq!(route.duration_min, 31);
        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.legs[0].start_address, "A");
        assert_eq!(route.legs[1].end_address, "C");
        assert!(!route.degraded);
        assert!(route.path.is_some());
    }

    #[test]
    fn a_second_dropoff_that_fails_geocoding_is_dropped() {
        let outcomes = vec![
            geocoded(46.09, -64.78, "A"),
            geocoded(46.11, -64.80, "B"),
            Err(no_route_error()),
        ];

        let (places, lost) = collect_places(outcomes).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[1].formatted_address, "B");
        assert!(lost);
    }

    #[test]
    fn pickup_and_first_dropoff_must_geocode() {
        let outcomes = vec![
            geocoded(46.09, -64.78, "A"),
            Err(no_route_error()),
            geocoded(46.23, -64.54, "C"),
        ];

        let err = collect_places(outcomes).unwrap_err();

        assert_eq!(err.code, 200);
    }

    #[test]
    fn a_fully_geocoded_request_keeps_every_stop() {
        let outcomes = vec![
            geocoded(46.09, -64.78, "A"),
            geocoded(46.11, -64.80, "B"),
            geocoded(46.23, -64.54, "C"),
        ];

        let (places, lost) = collect_places(outcomes).unwrap();

        assert_eq!(places.len(), 3);
        assert!(!lost);
    }

    #[test]
    fn a_leg_count_mismatch_is_an_upstream_error() {
        let request = RouteRequest::new("A".into(), "B".into(), Some("C".into())).unwrap();
        let places = vec![
            place(46.09, -64.78, "A"),
            place(46.11, -64.80, "B"),
            place(46.23, -64.54, "C"),
        ];
        let directions = DirectionsRoute {
            legs: vec![leg("A", "B", 8_400.0, 750.0)],
            overview_polyline: OverviewPolyline { points: "".into() },
        };

        let err = assemble_route(request, places, directions).unwrap_err();

        assert_eq!(err.code, 204);
    }
}
