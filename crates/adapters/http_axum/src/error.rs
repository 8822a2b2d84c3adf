//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use dunning_domain::error::DunningError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`DunningError`] and unreadable request bodies to an HTTP response
/// with appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    Domain(DunningError),
    /// The body was not JSON or did not match the expected shape.
    Body(JsonRejection),
}

impl From<DunningError> for ApiError {
    fn from(err: DunningError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Domain(err) => err,
            Self::Body(rejection) => {
                tracing::debug!(error = %rejection, "rejected request body");
                let body = ErrorBody {
                    error: rejection.body_text(),
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        };
        let (status, message) = match &err {
            DunningError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            DunningError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            DunningError::Dispatch(err) => {
                tracing::warn!(error = %err, "dispatch failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            DunningError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
