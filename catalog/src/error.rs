//! Error types for the catalog service.
//!
//! [`Error`] covers startup and lifecycle failures. [`ApiError`] wraps a
//! [`ResourceError`] and renders it as the JSON body every failed request returns:
//!
//! ```json
//! { "error": "Invalid resource id", "code": "INVALID_IDENTIFIER" }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use catalog_core::error::{ResourceError, StoreError};

/// Result type alias for service setup and lifecycle.
pub type Result<T> = std::result::Result<T, Error>;

/// Service setup and lifecycle errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Tracing initialization failed: {0}")]
    Telemetry(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// A failed resource request.
#[derive(Debug)]
pub struct ApiError(pub ResourceError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ResourceError::InvalidPayload(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ResourceError::InvalidQuery(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.0.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "request rejected");
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: Some(self.0.code()),
        };

        (status, Json(body)).into_response()
    }
}
