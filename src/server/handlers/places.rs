use axum::extract::{Json, Query};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::external::google_maps::{self, PlaceSuggestions};

#[derive(Serialize, Deserialize)]
pub struct SuggestParams {
    input: String,
    session_token: String,
}

// The provider bills autocomplete by session, so the client's session token
// rides along unchanged.
pub async fn suggestions(
    Query(params): Query<SuggestParams>,
) -> Result<Json<PlaceSuggestions>, Error> {
    let suggestions =
        google_maps::find_place_suggestions(params.input, params.session_token).await?;

    Ok(suggestions.into())
}
