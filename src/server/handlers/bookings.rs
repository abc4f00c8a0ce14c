use axum::extract::{Extension, Json, Path, Query};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::Booking;
use crate::error::Error;
use crate::server::DynAPI;
use crate::validation::BookingInput;

const DEFAULT_PAGE: i64 = 50;

#[derive(Deserialize)]
pub struct CreateParams {
    estimate_id: Uuid,
    #[serde(flatten)]
    input: BookingInput,
}

#[derive(Serialize, Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Booking>, Error> {
    let booking = api
        .create_booking(user, params.estimate_id, params.input)
        .await?;

    Ok(booking.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.find_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api
        .list_bookings(user, params.limit.unwrap_or(DEFAULT_PAGE))
        .await?;

    Ok(bookings.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.delete_booking(user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
