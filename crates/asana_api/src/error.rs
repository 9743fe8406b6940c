//! Error model used by Asana API client operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AsanaError>;

/// Represents error conditions that can occur during Asana API interactions,
/// including HTTP errors with status and message, credential rejections,
/// missing resources, timeouts, network issues and serialization problems.
#[derive(Debug, Error)]
pub enum AsanaError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
    },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl AsanaError {
    /// Constructs an HTTP error variant for a non-success response.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        AsanaError::Http {
            status,
            message: message.into(),
        }
    }

    /// True when the error means the session credential was rejected.
    pub fn is_authentication(&self) -> bool {
        matches!(self, AsanaError::Authentication(_))
    }
}

impl From<reqwest::Error> for AsanaError {
    /// Converts reqwest errors into semantic AsanaError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AsanaError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            AsanaError::Http {
                status,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            AsanaError::Network(err.to_string())
        } else {
            AsanaError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AsanaError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        AsanaError::Serialization(err.to_string())
    }
}
