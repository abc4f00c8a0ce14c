use super::helpers::clamp_page_limit;
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{BookingAPI, EstimateAPI},
    auth::User,
    entities::{Booking, Quote},
    error::{invalid_input_error, invalid_state_error, validation_error, Error},
    external::sendgrid,
    validation::{self, BookingInput, ValidationResult},
};

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_booking(
        &self,
        user: User,
        estimate_id: Uuid,
        input: BookingInput,
    ) -> Result<Booking, Error> {
        let details = match validation::validate(&input, Utc::now()) {
            ValidationResult::Valid(details) => details,
            ValidationResult::Invalid { failed, message } => {
                return Err(validation_error(
                    message,
                    failed.iter().map(|field| field.as_str().into()).collect(),
                ))
            }
        };

        let estimate = self.find_estimate(user.clone(), estimate_id).await?;
        let route = estimate.resolved_route().ok_or_else(invalid_state_error)?;

        let settings = self.settings_or_default().await;
        let quote = Quote::new(
            route.without_path(),
            settings,
            details.return_trip,
            user.id,
        );
        let booking = Booking::new(details, quote);

        // a booking whose notification never reached dispatch is not recorded
        sendgrid::send_booking_notification(&booking).await?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO bookings (id, created_at, data) VALUES ($1, $2, $3)")
                .bind(&booking.id)
                .bind(&booking.created_at)
                .bind(Json(&booking)),
        )
        .await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(invalid_input_error)?;
        let Json(booking) = result.try_get("data")?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn list_bookings(&self, user: User, limit: i64) -> Result<Vec<Booking>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bookings ORDER BY created_at DESC LIMIT $1")
                    .bind(clamp_page_limit(limit)),
            )
            .await?;

        let mut bookings = Vec::with_capacity(results.len());
        for result in results {
            let Json(booking): Json<Booking> = result.try_get("data")?;
            bookings.push(booking);
        }

        Ok(bookings)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_booking(&self, user: User, id: Uuid) -> Result<(), Error> {
        let booking = self.find_booking(user.clone(), id).await?;
        self.authorize(user, "delete", booking)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(sqlx::query("DELETE FROM bookings WHERE id = $1").bind(&id))
            .await?;

        Ok(())
    }
}
