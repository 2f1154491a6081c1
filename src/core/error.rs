//! Error taxonomy for calls made against the finance backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to the backend or driving a link flow.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `detail` carries the backend's explanation when it sent one.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Response (or request) did not have the expected shape.
    #[error("Invalid data: {0}")]
    Validation(String),

    /// The user closed the linking UI before it finished.
    #[error("Link cancelled: {0}")]
    Cancelled(String),

    /// Operation invoked from a state that does not accept it.
    #[error("Cannot {operation} while link session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
}

impl ClientError {
    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        ClientError::Http {
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Http { status: 401, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Validation(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::http(status, err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
