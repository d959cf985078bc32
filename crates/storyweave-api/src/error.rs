//! Storyweave API — error types.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storyweave_telemetry::error::ServiceError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Tracing or span export could not be set up.
    #[error("observability error: {0}")]
    Observability(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A telemetry command or query failed.
    Service(ServiceError),
    /// The request body is not acceptable JSON.
    InvalidJson(String),
    /// The query string could not be decoded.
    InvalidQuery(String),
    /// No API route matches.
    RouteNotFound(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::Service(err) => {
                let (status, code) = match &err {
                    ServiceError::SessionNotFound(_) => {
                        (StatusCode::NOT_FOUND, "session_not_found")
                    }
                    ServiceError::ConcurrencyConflict { .. } => {
                        (StatusCode::CONFLICT, "concurrency_conflict")
                    }
                    ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    ServiceError::Infrastructure(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
                    }
                };
                (status, code, err.to_string())
            }
            Self::InvalidJson(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_json", message)
            }
            Self::InvalidQuery(message) => (StatusCode::BAD_REQUEST, "invalid_query", message),
            Self::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no route for {path}"),
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
