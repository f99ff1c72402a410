//! Error types for overture-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from manifest operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The manifest file did not exist at the expected path.
    #[error("manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The manifest parsed but failed validation.
    #[error("invalid manifest at {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.overture/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
