use super::helpers::{fetch_access_request_for_update, update_access_request};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::AccessRequestAPI,
    auth::{Platform, User},
    config,
    entities::{AccessDecision, AccessRequest},
    error::{invalid_input_error, Error},
    validation,
};

#[async_trait]
impl AccessRequestAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_access_request(
        &self,
        user: User,
        email: String,
        display_name: String,
    ) -> Result<AccessRequest, Error> {
        if !validation::is_valid_email(email.trim()) {
            return Err(invalid_input_error());
        }

        let request = AccessRequest::new(email, display_name.trim().to_string());

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO access_requests (id, status, email, requested_at, data) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&request.id)
            .bind(request.status.name())
            .bind(&request.email)
            .bind(&request.requested_at)
            .bind(Json(&request)),
        )
        .await?;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn check_access(&self, user: User, email: String) -> Result<AccessDecision, Error> {
        let email = email.trim().to_ascii_lowercase();

        // super admins are configured, not requested
        if config::is_super_admin(&email) {
            return Ok(AccessDecision::approved());
        }

        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT data FROM access_requests WHERE email = $1 ORDER BY requested_at DESC LIMIT 1",
                )
                .bind(&email),
            )
            .await?;

        match maybe_result {
            Some(result) => {
                let Json(request): Json<AccessRequest> = result.try_get("data")?;
                Ok(AccessDecision::for_request(&request))
            }
            None => Ok(AccessDecision::not_found()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_access_requests(&self, user: User) -> Result<Vec<AccessRequest>, Error> {
        self.authorize(user, "list_access_requests", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(sqlx::query(
                "SELECT data FROM access_requests WHERE status = 'pending' ORDER BY requested_at ASC",
            ))
            .await?;

        let mut requests = Vec::with_capacity(results.len());
        for result in results {
            let Json(request): Json<AccessRequest> = result.try_get("data")?;
            requests.push(request);
        }

        Ok(requests)
    }

    #[tracing::instrument(skip(self))]
    async fn approve_access_request(&self, user: User, id: Uuid) -> Result<AccessRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_access_request_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "approve", request.clone())?;

        request.approve(user.email)?;

        update_access_request(&mut tx, &request).await?;
        tx.commit().await?;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn reject_access_request(
        &self,
        user: User,
        id: Uuid,
        reason: String,
    ) -> Result<AccessRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_access_request_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "reject", request.clone())?;

        request.reject(user.email, reason)?;

        update_access_request(&mut tx, &request).await?;
        tx.commit().await?;

        Ok(request)
    }
}
