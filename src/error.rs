//! Error types for the quote relay.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::RelayResponse;

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Invalid JSON body: {0}")]
    BadRequest(String),

    /// Details are logged, never returned to the caller.
    #[error("Internal error")]
    Internal,
}

impl Error {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Delivery(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(RelayResponse::failure(self.to_string()))).into_response()
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejections of a submitted quote request. Always fixable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required fields that were absent, blank, or not strings, in declared order.
    #[error("Missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid client email")]
    InvalidEmail,
}

/// Failure of the single delivery attempt, tagged by the phase that failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("SMTP connection failed: {0}")]
    Connection(String),

    #[error("SMTP authentication failed: {0}")]
    Auth(String),

    #[error("SMTP send failed: {0}")]
    Send(String),
}

impl DeliveryError {
    /// Coarse category name, suitable for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "ConnectionError",
            Self::Auth(_) => "AuthError",
            Self::Send(_) => "SendError",
        }
    }
}
