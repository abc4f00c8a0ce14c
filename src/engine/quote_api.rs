use super::helpers::clamp_page_limit;
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{EstimateAPI, QuoteAPI},
    auth::User,
    entities::Quote,
    error::{invalid_input_error, invalid_state_error, Error},
};

#[async_trait]
impl QuoteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_quote(&self, user: User, estimate_id: Uuid) -> Result<Quote, Error> {
        let estimate = self.find_estimate(user.clone(), estimate_id).await?;
        let route = estimate.resolved_route().ok_or_else(invalid_state_error)?;

        let settings = self.settings_or_default().await;
        let quote = Quote::new(
            route.without_path(),
            settings,
            estimate.return_trip,
            user.id,
        );

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO quotes (token, created_at, data) VALUES ($1, $2, $3)")
                .bind(&quote.token)
                .bind(&quote.created_at)
                .bind(Json(&quote)),
        )
        .await?;

        Ok(quote)
    }

    #[tracing::instrument(skip(self))]
    async fn find_quote(&self, user: User, token: Uuid) -> Result<Quote, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM quotes WHERE token = $1").bind(&token))
            .await?;

        let result = maybe_result.ok_or_else(invalid_input_error)?;
        let Json(quote) = result.try_get("data")?;

        Ok(quote)
    }

    #[tracing::instrument(skip(self))]
    async fn list_quotes(&self, user: User, limit: i64) -> Result<Vec<Quote>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM quotes ORDER BY created_at DESC LIMIT $1")
                    .bind(clamp_page_limit(limit)),
            )
            .await?;

        let mut quotes = Vec::with_capacity(results.len());
        for result in results {
            let Json(quote): Json<Quote> = result.try_get("data")?;
            quotes.push(quote);
        }

        Ok(quotes)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_quote(&self, user: User, token: Uuid) -> Result<(), Error> {
        let quote = self.find_quote(user.clone(), token).await?;
        self.authorize(user, "delete", quote)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(sqlx::query("DELETE FROM quotes WHERE token = $1").bind(&token))
            .await?;

        Ok(())
    }
}
