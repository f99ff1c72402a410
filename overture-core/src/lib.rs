//! Overture core library — domain types, manifest persistence, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, provisioning inputs, step state
//! - [`error`] — [`ManifestError`]
//! - [`manifest`] — load / save / validation

pub mod error;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use types::{
    AttemptState, ConfigSecret, ConfigVariable, Deployment, DeploymentId, RepoSlug, RunId,
    SealedSecret, SecretName, StepId, StepRecord, StepState, VariableName, WorkflowArtifact,
};
