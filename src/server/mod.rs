mod handlers;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Extension, FromRequest, RequestParts},
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::server::handlers::{access_requests, bookings, estimates, places, quotes, settings};
use crate::{api::API, auth::User};

type DynAPI = Arc<dyn API + Send + Sync>;

// Identity comes from the gateway's x-user-id and x-user-email headers;
// requests missing either are served as guests.
#[axum::async_trait]
impl<B: Send> FromRequest<B> for User {
    type Rejection = Infallible;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let id = req
            .headers()
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());

        let email = req
            .headers()
            .get("x-user-email")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match (id, email) {
            (Some(id), Some(email)) => Ok(User::identified(id, email)),
            _ => Ok(User::guest()),
        }
    }
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/estimates", post(estimates::create))
        .route("/estimates/:id", get(estimates::find))
        .route(
            "/estimates/:id/addresses",
            patch(estimates::update_addresses),
        )
        .route("/estimates/:id/resolve", post(estimates::resolve))
        .route("/quotes", post(quotes::create).get(quotes::list))
        .route("/quotes/:token", get(quotes::find).delete(quotes::delete))
        .route("/bookings", post(bookings::create).get(bookings::list))
        .route("/bookings/:id", get(bookings::find).delete(bookings::delete))
        .route("/settings", get(settings::fetch).put(settings::update))
        .route("/settings/reset", post(settings::reset))
        .route(
            "/access_requests",
            post(access_requests::create).get(access_requests::list),
        )
        .route("/access_requests/status", get(access_requests::status))
        .route(
            "/access_requests/:id/approve",
            patch(access_requests::approve),
        )
        .route(
            "/access_requests/:id/reject",
            patch(access_requests::reject),
        )
        .route("/places/suggestions", get(places::suggestions))
        .layer(Extension(api));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
