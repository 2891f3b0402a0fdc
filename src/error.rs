//! Error types for the booking service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDateTime;
use serde_json::json;
use thiserror::Error;

/// Errors raised by the time/calendar engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    #[error("Local time {0} does not exist in the host time zone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Errors raised by the booking store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Failed to acquire store lock: {0}")]
    Lock(String),
}

/// Errors surfaced at the service boundary and rendered as HTTP responses.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing selection: {0}")]
    MissingSelection(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External service failure: {0}")]
    ExternalService(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(format!("booking {}", id)),
            other => ServiceError::ExternalService(other.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingSelection(_)
            | ServiceError::Validation(_)
            | ServiceError::Calendar(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::MissingSelection(_) => "missing_selection",
            ServiceError::Validation(_) => "validation",
            ServiceError::Calendar(CalendarError::InvalidTimeFormat(_)) => "invalid_time_format",
            ServiceError::Calendar(CalendarError::NonexistentLocalTime(_)) => {
                "nonexistent_local_time"
            }
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::ExternalService(_) => "external_service",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}

/// Errors raised while loading configuration at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(String),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;
