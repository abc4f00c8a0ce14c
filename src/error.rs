use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::Debug;

// Codes 1..=99 are internal and masked in responses, 100..=199 input/state
// errors, 200..=219 route provider errors, 220..=239 notification transport
// errors.
#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub fields: Vec<String>,
}

impl Error {
    pub fn is_invalid_input_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_no_route_error(&self) -> bool {
        self.code == 200
    }
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        policy_error(err)
    }
}

impl From<sendgrid::error::SendgridError> for Error {
    fn from(err: sendgrid::error::SendgridError) -> Self {
        tracing::error!(?err, "notification transport failure");
        notification_send_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            103 => (StatusCode::FORBIDDEN, self.message.as_str()),
            100..=199 => (StatusCode::BAD_REQUEST, self.message.as_str()),
            200 | 203 => (StatusCode::BAD_REQUEST, self.message.as_str()),
            201 | 223 => (StatusCode::TOO_MANY_REQUESTS, self.message.as_str()),
            200..=239 => (StatusCode::BAD_GATEWAY, self.message.as_str()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        let body = if self.fields.is_empty() {
            Json(json!({
                "code": self.code,
                "error": error_message,
            }))
        } else {
            Json(json!({
                "code": self.code,
                "error": error_message,
                "fields": self.fields,
            }))
        };

        (status, body).into_response()
    }
}

fn plain(code: i32, message: &str) -> Error {
    Error {
        code,
        message: message.into(),
        fields: vec![],
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    plain(1, "environment variable error")
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(?err, "database error");
    plain(2, "database error")
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::error!(?err, "http client error");
    plain(3, "http client error")
}

pub fn policy_error(err: oso::OsoError) -> Error {
    tracing::error!(?err, "authorization policy error");
    plain(4, "authorization policy error")
}

pub fn invalid_state_error() -> Error {
    plain(100, "invalid state")
}

pub fn invalid_input_error() -> Error {
    plain(101, "invalid input")
}

pub fn invalid_invocation_error() -> Error {
    plain(102, "invalid invocation")
}

pub fn unauthorized_error() -> Error {
    plain(103, "unauthorized")
}

pub fn validation_error(message: String, fields: Vec<String>) -> Error {
    Error {
        code: 104,
        message,
        fields,
    }
}

pub fn no_route_error() -> Error {
    plain(200, "no route found between the given addresses")
}

pub fn rate_limited_error() -> Error {
    plain(
        201,
        "the mapping service is rate limiting requests, try again shortly",
    )
}

pub fn permission_denied_error() -> Error {
    plain(202, "the mapping service rejected our credentials")
}

pub fn malformed_request_error() -> Error {
    plain(203, "the mapping service rejected the route request")
}

pub fn upstream_route_error() -> Error {
    plain(204, "the mapping service failed to answer")
}

pub fn notification_config_error() -> Error {
    plain(220, "the booking notification service is not configured")
}

pub fn notification_auth_error() -> Error {
    plain(221, "the booking notification service rejected our credentials")
}

pub fn notification_access_error() -> Error {
    plain(222, "the booking notification service denied access")
}

pub fn notification_rate_error() -> Error {
    plain(223, "the booking notification service is rate limiting requests")
}

pub fn notification_send_error() -> Error {
    plain(224, "the booking notification could not be sent")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(err: Error) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn provider_failures_map_by_what_the_caller_can_do() {
        // correctable address input
        assert_eq!(status_for(no_route_error()), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(malformed_request_error()), StatusCode::BAD_REQUEST);

        // back off and retry
        assert_eq!(status_for(rate_limited_error()), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status_for(notification_rate_error()),
            StatusCode::TOO_MANY_REQUESTS
        );

        // nothing the caller can do
        assert_eq!(status_for(permission_denied_error()), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(upstream_route_error()), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(notification_send_error()), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_codes_are_masked() {
        assert_eq!(
            status_for(database_error("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_maps_to_forbidden() {
        assert_eq!(status_for(unauthorized_error()), StatusCode::FORBIDDEN);
    }
}
