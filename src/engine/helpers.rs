use super::Database;

use sqlx::{types::Json, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{AccessRequest, Estimate},
    error::{invalid_input_error, Error},
};

// History pages never need more than this many rows at once.
const MAX_PAGE_LIMIT: i64 = 200;

pub fn clamp_page_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_estimate_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Estimate, Error> {
    let Json(estimate): Json<Estimate> = tx
        .fetch_optional(sqlx::query("SELECT data FROM estimates WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(invalid_input_error)?
        .try_get("data")?;

    Ok(estimate)
}

#[tracing::instrument(skip(tx))]
pub async fn update_estimate(
    tx: &mut Transaction<'_, Database>,
    estimate: &Estimate,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE estimates SET status = $2, data = $3 WHERE id = $1")
            .bind(&estimate.id)
            .bind(estimate.status.name())
            .bind(Json(estimate)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_access_request_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<AccessRequest, Error> {
    let Json(request): Json<AccessRequest> = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM access_requests WHERE id = $1 FOR UPDATE").bind(id),
        )
        .await?
        .ok_or_else(invalid_input_error)?
        .try_get("data")?;

    Ok(request)
}

#[tracing::instrument(skip(tx))]
pub async fn update_access_request(
    tx: &mut Transaction<'_, Database>,
    request: &AccessRequest,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE access_requests SET status = $2, data = $3 WHERE id = $1")
            .bind(&request.id)
            .bind(request.status.name())
            .bind(Json(request)),
    )
    .await?;

    Ok(())
}
