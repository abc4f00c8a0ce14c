use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Estimate, RouteRequest};
use crate::error::{invalid_input_error, Error};
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    pickup: Option<String>,
    dropoff: Option<String>,
    second_dropoff: Option<String>,
    #[serde(default)]
    return_trip: bool,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateAddressesParams {
    pickup: String,
    dropoff: String,
    second_dropoff: Option<String>,
    return_trip: Option<bool>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Estimate>, Error> {
    // an estimate may start out blank, but never with half an itinerary
    let request = match (params.pickup, params.dropoff) {
        (Some(pickup), Some(dropoff)) => {
            Some(RouteRequest::new(pickup, dropoff, params.second_dropoff)?)
        }
        (None, None) => None,
        _ => return Err(invalid_input_error()),
    };

    let estimate = api
        .create_estimate(user, request, params.return_trip)
        .await?;

    Ok(estimate.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Estimate>, Error> {
    let estimate = api.find_estimate(user, id).await?;

    Ok(estimate.into())
}

pub async fn update_addresses(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateAddressesParams>,
) -> Result<Json<Estimate>, Error> {
    let request = RouteRequest::new(params.pickup, params.dropoff, params.second_dropoff)?;

    let estimate = api
        .update_addresses(user, id, request, params.return_trip)
        .await?;

    Ok(estimate.into())
}

pub async fn resolve(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Estimate>, Error> {
    let estimate = api.resolve_estimate(user, id).await?;

    Ok(estimate.into())
}
