use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};

use crate::{
    api::SettingsAPI,
    auth::{Platform, User},
    entities::FareSettings,
    error::Error,
};

// the key the settings document has always been stored under
const SETTINGS_KEY: &str = "fareSettings";

impl Engine {
    // Fare settings are not safety-critical; a failed load degrades to the
    // defaults with a warning instead of failing the quote.
    pub(super) async fn settings_or_default(&self) -> FareSettings {
        match self.load_settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => FareSettings::default(),
            Err(err) => {
                tracing::warn!(
                    code = err.code,
                    "could not load fare settings, falling back to defaults"
                );
                FareSettings::default()
            }
        }
    }

    async fn load_settings(&self) -> Result<Option<FareSettings>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM settings WHERE key = $1").bind(SETTINGS_KEY),
            )
            .await?;

        match maybe_result {
            Some(result) => {
                let Json(settings) = result.try_get("data")?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    // The single write path for settings; concurrent writers are
    // last-write-wins.
    async fn store_settings(&self, settings: &FareSettings) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO settings (key, data) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET data = $2",
            )
            .bind(SETTINGS_KEY)
            .bind(Json(settings)),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn fetch_settings(&self, user: User) -> Result<FareSettings, Error> {
        Ok(self.load_settings().await?.unwrap_or_default())
    }

    #[tracing::instrument(skip(self))]
    async fn update_settings(
        &self,
        user: User,
        settings: FareSettings,
    ) -> Result<FareSettings, Error> {
        self.authorize(user, "update_settings", Platform::default())?;

        settings.validate()?;
        self.store_settings(&settings).await?;

        Ok(settings)
    }

    #[tracing::instrument(skip(self))]
    async fn reset_settings(&self, user: User) -> Result<FareSettings, Error> {
        self.authorize(user, "reset_settings", Platform::default())?;

        let settings = FareSettings::default();
        self.store_settings(&settings).await?;

        Ok(settings)
    }
}
