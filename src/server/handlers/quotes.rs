use axum::extract::{Extension, Json, Path, Query};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::Quote;
use crate::error::Error;
use crate::server::DynAPI;

const DEFAULT_PAGE: i64 = 50;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    estimate_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Quote>, Error> {
    let quote = api.create_quote(user, params.estimate_id).await?;

    Ok(quote.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(token): Path<Uuid>,
) -> Result<Json<Quote>, Error> {
    let quote = api.find_quote(user, token).await?;

    Ok(quote.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Quote>>, Error> {
    let quotes = api
        .list_quotes(user, params.limit.unwrap_or(DEFAULT_PAGE))
        .await?;

    Ok(quotes.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(token): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.delete_quote(user, token).await?;

    Ok(StatusCode::NO_CONTENT)
}
