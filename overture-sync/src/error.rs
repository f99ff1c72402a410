//! Error types for overture-sync.

use std::path::PathBuf;

use thiserror::Error;

use overture_client::ApiError;
use overture_core::ManifestError;
use overture_seal::SealError;

/// All errors that can arise from provisioning operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the repository host API.
    #[error("host error: {0}")]
    Api(#[from] ApiError),

    /// An error from the sealing boundary.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),

    /// An error from manifest handling.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (attempt store).
    #[error("attempt store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
