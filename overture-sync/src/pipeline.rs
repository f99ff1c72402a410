//! Shared provisioning pipeline entrypoint used by the CLI commands.

use async_trait::async_trait;

use overture_client::RepoHost;
use overture_core::{
    manifest::Manifest, AttemptState, ConfigSecret, ConfigVariable, RepoSlug, StepId,
    WorkflowArtifact,
};

use crate::error::SyncError;
use crate::propagate::{propagate_secrets, propagate_variables};
use crate::steps::{run_steps, RunOutcome, StepExecutor};
use crate::upsert::upsert_file;

/// The production [`StepExecutor`]: binds one attempt's inputs to the host
/// client. Inputs are captured once at construction and immutable for the
/// attempt; a retry builds a fresh executor.
pub struct HostExecutor {
    host: RepoHost,
    repo: RepoSlug,
    branch: String,
    artifact: WorkflowArtifact,
    variables: Vec<ConfigVariable>,
    secrets: Vec<ConfigSecret>,
}

impl HostExecutor {
    pub fn new(
        host: RepoHost,
        repo: RepoSlug,
        branch: String,
        artifact: WorkflowArtifact,
        variables: Vec<ConfigVariable>,
        secrets: Vec<ConfigSecret>,
    ) -> Self {
        Self {
            host,
            repo,
            branch,
            artifact,
            variables,
            secrets,
        }
    }

    /// Assemble an executor from a manifest: reads the workflow source file
    /// and resolves secret plaintexts from the environment.
    pub fn from_manifest(host: RepoHost, manifest: &Manifest) -> Result<Self, SyncError> {
        Ok(Self::new(
            host,
            manifest.repo.clone(),
            manifest.branch.clone(),
            manifest.artifact()?,
            manifest.variables(),
            manifest.secrets_from_env(),
        ))
    }
}

#[async_trait]
impl StepExecutor for HostExecutor {
    fn item_count(&self, step: StepId) -> usize {
        match step {
            StepId::Artifact => 1,
            StepId::Variables => self.variables.len(),
            // Empty secrets are skipped outright, so they are not applicable
            // items — an all-empty set makes the step vacuous.
            StepId::Secrets => self.secrets.iter().filter(|s| !s.is_empty()).count(),
        }
    }

    async fn execute(&self, step: StepId) -> Result<Option<String>, SyncError> {
        match step {
            StepId::Artifact => {
                let outcome =
                    upsert_file(&self.host, &self.repo, &self.branch, &self.artifact).await?;
                Ok(outcome.commit_sha().map(str::to_string))
            }
            StepId::Variables => {
                propagate_variables(&self.host, &self.repo, &self.variables).await?;
                Ok(None)
            }
            StepId::Secrets => {
                propagate_secrets(&self.host, &self.repo, &self.secrets).await?;
                Ok(None)
            }
        }
    }
}

/// Run the provisioning pipeline for one manifest from `from` onward.
///
/// This is the canonical entrypoint for `overture provision` and
/// `overture retry`. The caller owns `state` (loaded from and saved back to
/// the attempt store) and must serialize attempts per repository — taking
/// the state by exclusive reference makes concurrent attempts against one
/// target a compile error, not a race.
pub async fn run(
    host: &RepoHost,
    manifest: &Manifest,
    state: &mut AttemptState,
    from: StepId,
) -> Result<RunOutcome, SyncError> {
    let executor = HostExecutor::from_manifest(host.clone(), manifest)?;
    Ok(run_steps(state, from, &executor).await)
}
