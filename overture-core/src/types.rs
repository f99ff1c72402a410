//! Domain types for the Overture provisioning pipeline.
//!
//! Everything that crosses a crate boundary is strongly typed: repository
//! slugs, variable/secret names, and run identifiers are newtypes, never bare
//! strings. Secret plaintext is redacted from `Debug` output and is never
//! serializable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A repository slug in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug(pub String);

impl RepoSlug {
    /// Split into `(owner, name)`, or `None` if the slug is malformed.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.0.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((owner, name))
    }

    /// Filesystem-safe key for per-repository state files.
    pub fn store_key(&self) -> String {
        self.0.replace('/', "__")
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoSlug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoSlug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed repository variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableName(pub String);

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for VariableName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VariableName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed repository secret name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretName(pub String);

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SecretName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a CI run on the repository host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a deployment record on the repository host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(pub u64);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Provisioning inputs
// ---------------------------------------------------------------------------

/// The generated CI workflow definition to commit into the target repository.
///
/// Immutable for the duration of one provisioning attempt; a retry replaces
/// it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowArtifact {
    /// In-repository path, e.g. `.github/workflows/deploy.yml`.
    pub path: String,
    pub content: String,
    pub commit_message: String,
}

/// A plaintext repository variable. Explicit empty values are meaningful and
/// are still applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigVariable {
    pub name: VariableName,
    pub value: String,
}

/// A secret value before sealing.
///
/// The plaintext exists only transiently in memory: it is never serialized,
/// never persisted, and `Debug` redacts it.
#[derive(Clone)]
pub struct ConfigSecret {
    pub name: SecretName,
    pub plaintext: String,
}

impl ConfigSecret {
    /// Empty secrets are never propagated — skipping them prevents an
    /// accidental credential wipe on the host.
    pub fn is_empty(&self) -> bool {
        self.plaintext.is_empty()
    }
}

impl fmt::Debug for ConfigSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSecret")
            .field("name", &self.name)
            .field("plaintext", &"<redacted>")
            .finish()
    }
}

/// A sealed secret — the only form allowed to cross into propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub name: SecretName,
    /// Base64 sealed-box ciphertext.
    pub ciphertext: String,
    /// Identifier of the recipient key the plaintext was sealed against.
    pub key_id: String,
}

// ---------------------------------------------------------------------------
// Step state
// ---------------------------------------------------------------------------

/// The three provisioning steps, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Artifact,
    Variables,
    Secrets,
}

impl StepId {
    /// All steps in execution order. The artifact must land before variables
    /// and secrets are meaningful, since the workflow text references them by
    /// name.
    pub fn all() -> &'static [StepId] {
        &[StepId::Artifact, StepId::Variables, StepId::Secrets]
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Artifact => write!(f, "artifact"),
            StepId::Variables => write!(f, "variables"),
            StepId::Secrets => write!(f, "secrets"),
        }
    }
}

impl std::str::FromStr for StepId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artifact" => Ok(StepId::Artifact),
            "variables" => Ok(StepId::Variables),
            "secrets" => Ok(StepId::Secrets),
            other => Err(format!(
                "unknown step '{other}'; expected: artifact, variables, secrets"
            )),
        }
    }
}

/// Lifecycle state of a single step within one attempt.
///
/// Transitions are monotonic per attempt:
/// `pending → in_progress → success | error`. Only `error` (or
/// not-yet-attempted) steps can be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    #[default]
    Pending,
    InProgress,
    Success,
    Error,
}

/// Per-step record, mutated only by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: StepId,
    pub state: StepState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StepRecord {
    pub fn pending(step: StepId) -> Self {
        Self {
            step,
            state: StepState::Pending,
            last_error: None,
        }
    }
}

/// Per-attempt provisioning state — an explicit value object, returned by the
/// orchestrator and passed back into `retry`. No ambient singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    /// One record per step, in execution order.
    pub steps: Vec<StepRecord>,
    /// Commit sha produced by the artifact write, once it has landed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// Set when the attempt first completed; used to signal completion
    /// exactly once rather than on every poll of an already-complete state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AttemptState {
    pub fn new() -> Self {
        Self {
            steps: StepId::all().iter().map(|s| StepRecord::pending(*s)).collect(),
            commit_sha: None,
            completed_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn record(&self, step: StepId) -> &StepRecord {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .unwrap_or_else(|| unreachable!("attempt state is constructed with every step"))
    }

    pub fn record_mut(&mut self, step: StepId) -> &mut StepRecord {
        self.steps
            .iter_mut()
            .find(|r| r.step == step)
            .unwrap_or_else(|| unreachable!("attempt state is constructed with every step"))
    }

    /// Reset `from` and every later step to `Pending`; earlier steps keep
    /// their state.
    pub fn reset_from(&mut self, from: StepId) {
        let start = StepId::all().iter().position(|s| *s == from).unwrap_or(0);
        for step in &StepId::all()[start..] {
            *self.record_mut(*step) = StepRecord::pending(*step);
        }
        self.updated_at = Utc::now();
    }

    /// Complete ⇔ every step is `Success` (zero-item steps are vacuously
    /// successful and marked as such by the orchestrator).
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|r| r.state == StepState::Success)
    }

    /// The first step currently in `Error`, if any — the retry entry point.
    pub fn first_error(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|r| r.state == StepState::Error)
            .map(|r| r.step)
    }
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

/// A deployment record on the repository host. Created externally; the
/// correlated run id is attached after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub sha: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attached by the correlator, never by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
