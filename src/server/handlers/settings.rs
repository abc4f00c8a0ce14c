use axum::extract::{Extension, Json};

use crate::auth::User;
use crate::entities::FareSettings;
use crate::error::Error;
use crate::server::DynAPI;

pub async fn fetch(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<FareSettings>, Error> {
    let settings = api.fetch_settings(user).await?;

    Ok(settings.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(settings): Json<FareSettings>,
) -> Result<Json<FareSettings>, Error> {
    let settings = api.update_settings(user, settings).await?;

    Ok(settings.into())
}

pub async fn reset(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<FareSettings>, Error> {
    let settings = api.reset_settings(user).await?;

    Ok(settings.into())
}
