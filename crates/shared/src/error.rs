use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for every client-side operation.
///
/// The gateway maps all non-success HTTP outcomes to `Api` uniformly; the
/// only status with special meaning is 401, and the session controller is
/// the sole consumer of that distinction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Transport-level failure: no response was received at all.
    #[error("network failure: {0}")]
    Network(String),

    /// The server responded with a non-success status.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// Rejected client-side before any request was issued.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the server no longer accepts the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Structured error body the backend attaches to failure responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}
