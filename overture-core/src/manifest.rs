//! Provisioning manifest — `overture.yaml`.
//!
//! The manifest names everything one provisioning attempt needs:
//!
//! ```yaml
//! repo: acme/storefront
//! branch: main
//! workflow:
//!   path: .github/workflows/deploy.yml
//!   source: ./deploy.yml
//!   commit_message: "ci: add deploy workflow"
//! variables:
//!   NODE_VERSION: "20"
//! secrets:
//!   - DEPLOY_TOKEN
//! ```
//!
//! Secret *values* never appear here: only names are listed, and the
//! plaintext is resolved from the process environment at provision time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::types::{ConfigSecret, ConfigVariable, RepoSlug, WorkflowArtifact};

/// Default manifest filename, resolved against the current directory.
pub const DEFAULT_MANIFEST: &str = "overture.yaml";

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_COMMIT_MESSAGE: &str = "ci: add generated workflow";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The workflow artifact section of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// In-repository destination path.
    pub path: String,
    /// Local file holding the generated workflow text.
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

/// Root of the `overture.yaml` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub repo: RepoSlug,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub workflow: WorkflowSpec,
    /// Plaintext variables, applied verbatim (empty values included).
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Secret *names*; values come from the environment at provision time.
    #[serde(default)]
    pub secrets: Vec<String>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl Manifest {
    /// Read the workflow source file and assemble the artifact for one
    /// attempt.
    pub fn artifact(&self) -> Result<WorkflowArtifact, ManifestError> {
        let content = std::fs::read_to_string(&self.workflow.source)?;
        Ok(WorkflowArtifact {
            path: self.workflow.path.clone(),
            content,
            commit_message: self
                .workflow
                .commit_message
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        })
    }

    /// The variables to propagate, in manifest (sorted) order.
    pub fn variables(&self) -> Vec<ConfigVariable> {
        self.variables
            .iter()
            .map(|(name, value)| ConfigVariable {
                name: name.as_str().into(),
                value: value.clone(),
            })
            .collect()
    }

    /// Resolve secret plaintexts from the process environment.
    ///
    /// A name whose variable is unset resolves to an empty plaintext, which
    /// the propagator skips rather than wiping the remote credential.
    pub fn secrets_from_env(&self) -> Vec<ConfigSecret> {
        self.secrets
            .iter()
            .map(|name| ConfigSecret {
                name: name.as_str().into(),
                plaintext: std::env::var(name).unwrap_or_default(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load and validate the manifest at `path`.
///
/// Returns `ManifestError::ManifestNotFound` if absent, `ManifestError::Parse`
/// (with path + line context) if malformed YAML, and `ManifestError::Invalid`
/// if the parsed manifest fails validation.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_yaml::from_str(&contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&manifest, path)?;
    Ok(manifest)
}

/// Atomically save the manifest: serialize → `.yaml.tmp` sibling → rename.
pub fn save(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    validate(manifest, path)?;
    let yaml = serde_yaml::to_string(manifest)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn validate(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let invalid = |message: String| ManifestError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    if manifest.repo.parts().is_none() {
        return Err(invalid(format!(
            "repo '{}' is not an owner/name slug",
            manifest.repo
        )));
    }
    if manifest.workflow.path.trim().is_empty() {
        return Err(invalid("workflow.path must not be empty".to_string()));
    }
    if manifest.branch.trim().is_empty() {
        return Err(invalid("branch must not be empty".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
