//! Caller-driven run status polling.
//!
//! Polls at a fixed interval only while the derived status is active
//! (queued or in progress) and stops on the first terminal observation. The
//! fetch is injected as a closure so the loop is testable under paused time;
//! an overall deadline, if any, is the caller's concern.

use std::future::Future;
use std::time::Duration;

use overture_client::{ApiError, RepoHost};
use overture_core::{RepoSlug, RunId};

use crate::status::RunStatus;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Poll `fetch` at `interval` until it reports a non-active status.
///
/// `on_update` sees every observation, including the terminal one.
pub async fn watch_with<F, Fut, E>(
    interval: Duration,
    mut fetch: F,
    mut on_update: impl FnMut(&RunStatus),
) -> Result<RunStatus, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunStatus, E>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let status = fetch().await?;
        on_update(&status);
        if !status.derived.is_active() {
            tracing::debug!(run_id = %status.run_id, derived = %status.derived, "terminal status observed");
            return Ok(status);
        }
    }
}

/// Poll the host for `run` until it reaches a terminal status.
pub async fn watch(
    host: &RepoHost,
    repo: &RepoSlug,
    run: RunId,
    interval: Duration,
    on_update: impl FnMut(&RunStatus),
) -> Result<RunStatus, ApiError> {
    watch_with(
        interval,
        || {
            let runs = host.runs();
            let repo = repo.clone();
            async move {
                let observed = runs.get(&repo, run).await?;
                Ok(RunStatus::from_run(&observed))
            }
        },
        on_update,
    )
    .await
}
