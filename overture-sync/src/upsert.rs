//! Compare-and-swap file upsert against the repository host.
//!
//! ## `upsert_file` — read-then-conditional-write protocol
//!
//! 1. Read the current file at `path@branch`; absence is expected, not an
//!    error.
//! 2. If the remote content already equals the desired content, skip the
//!    write — the upsert is a no-op.
//! 3. Otherwise write content + the captured content identifier (none for a
//!    fresh file) + commit message. The host rejects the write when the
//!    identifier is stale.
//! 4. On `Conflict`, restart from step 1 (bounded); on `RemoteUnavailable`,
//!    back off and retry the same request (bounded). Everything else
//!    propagates.
//!
//! This is compare-and-swap over one resource: it never clobbers concurrent
//! edits and needs no distributed lock.

use std::future::Future;
use std::time::Duration;

use overture_client::{ApiError, FileWriteBody, RepoHost};
use overture_core::{RepoSlug, WorkflowArtifact};

use crate::error::SyncError;

/// Re-read attempts after a stale-identifier conflict.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Retries of a single request while the remote is unavailable.
const MAX_UNAVAILABLE_RETRIES: u32 = 3;

/// Base backoff delay, doubled per unavailable retry.
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Outcome of a file upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The file was written; carries the commit sha the host produced.
    Written { commit_sha: String },
    /// The remote content already matched; no write was issued.
    Unchanged { sha: String },
}

impl UpsertOutcome {
    /// The commit sha, when this outcome produced one.
    pub fn commit_sha(&self) -> Option<&str> {
        match self {
            UpsertOutcome::Written { commit_sha } => Some(commit_sha),
            UpsertOutcome::Unchanged { .. } => None,
        }
    }
}

/// Idempotently upsert `artifact` at `artifact.path@branch`.
pub async fn upsert_file(
    host: &RepoHost,
    repo: &RepoSlug,
    branch: &str,
    artifact: &WorkflowArtifact,
) -> Result<UpsertOutcome, SyncError> {
    let contents = host.contents();
    let mut last_conflict: Option<ApiError> = None;

    for attempt in 0..MAX_CONFLICT_RETRIES {
        // Step 1: read, capturing the content identifier if the file exists.
        let current = with_unavailable_backoff(|| {
            contents.get_file(repo, &artifact.path, branch)
        })
        .await?;

        let sha = match current {
            Some(file) => {
                // Step 2: skip identical content.
                if file.decoded_content()? == artifact.content {
                    tracing::debug!(path = %artifact.path, "unchanged: remote already matches");
                    return Ok(UpsertOutcome::Unchanged { sha: file.sha });
                }
                Some(file.sha)
            }
            None => None,
        };

        // Step 3: conditional write.
        let body = FileWriteBody::new(&artifact.commit_message, &artifact.content, branch, sha);
        let written = with_unavailable_backoff(|| {
            contents.put_file(repo, &artifact.path, &body)
        })
        .await;

        match written {
            Ok(response) => {
                tracing::info!(path = %artifact.path, sha = %response.commit.sha, "wrote workflow file");
                return Ok(UpsertOutcome::Written {
                    commit_sha: response.commit.sha,
                });
            }
            Err(err) if err.is_conflict() => {
                tracing::warn!(
                    path = %artifact.path,
                    attempt = attempt + 1,
                    "stale content identifier, re-reading",
                );
                last_conflict = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(last_conflict
        .unwrap_or_else(|| ApiError::Conflict("write kept losing the race".to_string()))
        .into())
}

/// Run `op`, retrying only `RemoteUnavailable` failures with doubling backoff.
async fn with_unavailable_backoff<T, F, Fut>(mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = overture_client::Result<T>>,
{
    let mut delay = BACKOFF_BASE;
    for attempt in 0..MAX_UNAVAILABLE_RETRIES {
        match op().await {
            Err(ApiError::RemoteUnavailable(reason))
                if attempt + 1 < MAX_UNAVAILABLE_RETRIES =>
            {
                tracing::warn!(attempt = attempt + 1, %reason, "remote unavailable, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            other => return other,
        }
    }
    unreachable!("loop returns on the final attempt")
}
