use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::model::ModelError;

/// Every failure a handler can produce. Each kind maps to exactly one status
/// code; handlers convert with `?` and nothing propagates past them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or empty client input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Payload parsed but a field failed schema validation.
    #[error("{0}")]
    InvalidSchema(String),

    /// The request needs the real backend but the service is in mock mode.
    #[error("no local model is loaded; image_url prediction requires one")]
    ServiceUnavailable,

    /// The client-supplied URL could not be fetched.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// Decode or backend failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSchema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Fetch(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}: {}", status, self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<image::ImageError> for ApiError {
    fn from(err: image::ImageError) -> Self {
        ApiError::Internal(format!("failed to decode image: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_its_status() {
        let cases = [
            (ApiError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::InvalidSchema("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Fetch("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected);
        }
    }

    #[test]
    fn fetch_failures_are_client_errors_not_500s() {
        // An unreachable URL is the client's input, never an internal fault.
        let err = ApiError::Fetch("connection timed out".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
