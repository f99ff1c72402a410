//! Deployment–run correlation.
//!
//! Deployments and CI runs are created by two unrelated subsystems that
//! share no foreign key; the only join key is the head commit sha. The join
//! is best-effort and eventually consistent: immediately after a deployment
//! event there is often no run scheduled yet, so "no match" is a valid
//! state, not an error. Callers must not retry synchronously — only re-poll
//! later.

use overture_client::{ApiError, RepoHost};
use overture_core::{Deployment, RepoSlug, RunId};

/// Find the CI run triggered by the commit `head_sha`.
///
/// Returns the most recent matching run's id, or `None` when no run has
/// appeared yet.
///
/// `path_hint`, when given, keeps only runs whose workflow path contains the
/// substring. This disambiguates the common case of several workflows firing
/// on one commit, but it is a heuristic, not a guarantee.
pub async fn correlate(
    host: &RepoHost,
    repo: &RepoSlug,
    head_sha: &str,
    path_hint: Option<&str>,
) -> Result<Option<RunId>, ApiError> {
    let runs = host.runs().list_for_commit(repo, head_sha).await?;
    let matched = runs
        .iter()
        .filter(|run| match path_hint {
            Some(hint) => run.path.as_deref().is_some_and(|p| p.contains(hint)),
            None => true,
        })
        .max_by_key(|run| run.created_at);

    match matched {
        Some(run) => {
            tracing::debug!(run_id = run.id, %head_sha, "correlated run");
            Ok(Some(RunId(run.id)))
        }
        None => {
            tracing::debug!(%head_sha, "no run for commit yet");
            Ok(None)
        }
    }
}

/// Correlate a deployment record, returning it with `run_id` attached when a
/// run was found.
pub async fn correlate_deployment(
    host: &RepoHost,
    repo: &RepoSlug,
    deployment: &Deployment,
    path_hint: Option<&str>,
) -> Result<Deployment, ApiError> {
    let run_id = correlate(host, repo, &deployment.sha, path_hint).await?;
    Ok(Deployment {
        run_id,
        ..deployment.clone()
    })
}
