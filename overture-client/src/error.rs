//! Client error taxonomy.
//!
//! Every remote failure is classified into one of a small set of kinds so
//! callers can route on them: expected absence becomes control flow, stale
//! writes and outages are retryable, scope problems are terminal.

use thiserror::Error;

/// Errors from the repository host API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource does not exist. Expected in several flows (fresh file,
    /// variable create fallback) — consumed locally there, never surfaced.
    #[error("not found: {0}")]
    NotFound(String),

    /// Token lacks the required scope or is rejected. Terminal.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Conditional write lost the race — the content identifier was stale.
    /// Retryable by re-reading.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network failure or host 5xx. Retryable with backoff.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// URL construction failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client-side configuration problem (bad base URL, bad token). Terminal.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything the taxonomy does not recognize. Terminal.
    #[error("host error ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl ApiError {
    /// Classify an HTTP status + host message.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => ApiError::NotFound(message),
            401 | 403 => ApiError::NotAuthorized(message),
            409 | 422 => ApiError::Conflict(message),
            s if s >= 500 => ApiError::RemoteUnavailable(format!("HTTP {s}: {message}")),
            s => ApiError::Unknown {
                status: s,
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    /// Retryable ⇔ the failure is transient: a stale-identifier conflict or
    /// an unavailable remote.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Conflict(_) | ApiError::RemoteUnavailable(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return ApiError::RemoteUnavailable(err.to_string());
        }
        ApiError::Unknown {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body shape returned by the host.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}
