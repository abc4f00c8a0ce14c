use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{AccessDecision, AccessRequest};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    email: String,
    display_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatusParams {
    email: String,
}

#[derive(Serialize, Deserialize)]
pub struct RejectParams {
    reason: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<AccessRequest>, Error> {
    let request = api
        .create_access_request(user, params.email, params.display_name)
        .await?;

    Ok(request.into())
}

pub async fn status(
    Extension(api): Extension<DynAPI>,
    user: User,
    Query(params): Query<StatusParams>,
) -> Result<Json<AccessDecision>, Error> {
    let decision = api.check_access(user, params.email).await?;

    Ok(decision.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<AccessRequest>>, Error> {
    let requests = api.list_access_requests(user).await?;

    Ok(requests.into())
}

pub async fn approve(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<AccessRequest>, Error> {
    let request = api.approve_access_request(user, id).await?;

    Ok(request.into())
}

pub async fn reject(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(params): Json<RejectParams>,
) -> Result<Json<AccessRequest>, Error> {
    let request = api
        .reject_access_request(user, id, params.reason.unwrap_or_default())
        .await?;

    Ok(request.into())
}
