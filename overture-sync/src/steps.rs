//! Step orchestration for one provisioning attempt.
//!
//! The three steps run in fixed order: artifact → variables → secrets. Each
//! step transitions `pending → in_progress → success | error`; a failure
//! records the error and halts, leaving later steps pending — they are never
//! speculatively attempted. Retrying a step resets it and everything after
//! it, which is always safe because the executors are idempotent upserts:
//! retried work is bounded to exactly the failed step and what follows, and
//! already-applied changes are never re-applied ahead of a failed commit.

use async_trait::async_trait;
use chrono::Utc;

use overture_core::{AttemptState, StepId, StepState};

use crate::error::SyncError;

/// The work behind each step. Injected so orchestration is testable without
/// a live host; the production implementation is
/// [`HostExecutor`](crate::pipeline::HostExecutor).
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Number of applicable items for `step`. A step with zero items is
    /// vacuously successful and its executor is never invoked.
    fn item_count(&self, step: StepId) -> usize;

    /// Execute `step`. The artifact step returns the commit sha it produced
    /// (`None` when the remote already matched); other steps return `None`.
    async fn execute(&self, step: StepId) -> Result<Option<String>, SyncError>;
}

/// Outcome of one `run_steps` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The step that failed and halted the attempt, if any. Its error text
    /// is recorded on the corresponding [`overture_core::StepRecord`].
    pub halted_on: Option<StepId>,
    /// True exactly once per completion: set on the invocation that first
    /// drives every step to success, never on later no-op reruns.
    pub newly_completed: bool,
}

/// Run the steps from `from` onward.
///
/// Steps before `from` keep their `success` state and their executors are
/// not re-invoked. If a step before `from` is not yet successful, execution
/// is clamped back to it — starting later would skip unapplied work.
pub async fn run_steps<E>(state: &mut AttemptState, from: StepId, executor: &E) -> RunOutcome
where
    E: StepExecutor + ?Sized,
{
    let all = StepId::all();
    let requested = all.iter().position(|s| *s == from).unwrap_or(0);
    let first_incomplete = all
        .iter()
        .position(|s| state.record(*s).state != StepState::Success)
        .unwrap_or(requested);
    let start = requested.min(first_incomplete);

    state.reset_from(all[start]);

    for step in &all[start..] {
        if executor.item_count(*step) == 0 {
            tracing::debug!(step = %step, "no applicable items, vacuously successful");
            state.record_mut(*step).state = StepState::Success;
            continue;
        }

        state.record_mut(*step).state = StepState::InProgress;
        match executor.execute(*step).await {
            Ok(commit_sha) => {
                state.record_mut(*step).state = StepState::Success;
                if let Some(sha) = commit_sha {
                    state.commit_sha = Some(sha);
                }
                tracing::info!(step = %step, "step succeeded");
            }
            Err(err) => {
                let record = state.record_mut(*step);
                record.state = StepState::Error;
                record.last_error = Some(err.to_string());
                state.updated_at = Utc::now();
                tracing::error!(step = %step, error = %err, "step failed, halting attempt");
                return RunOutcome {
                    halted_on: Some(*step),
                    newly_completed: false,
                };
            }
        }
    }

    state.updated_at = Utc::now();
    let newly_completed = state.is_complete() && state.completed_at.is_none();
    if newly_completed {
        state.completed_at = Some(state.updated_at);
    }
    RunOutcome {
        halted_on: None,
        newly_completed,
    }
}

/// Retry from `step`. Identical to [`run_steps`] — spelled out because it is
/// the user-facing recovery action.
pub async fn retry<E>(state: &mut AttemptState, step: StepId, executor: &E) -> RunOutcome
where
    E: StepExecutor + ?Sized,
{
    run_steps(state, step, executor).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use overture_client::ApiError;

    /// Scripted executor: counts invocations per step and fails the steps it
    /// is told to fail.
    struct FakeExecutor {
        counts: Mutex<HashMap<StepId, usize>>,
        failing: Vec<StepId>,
        items: HashMap<StepId, usize>,
    }

    impl FakeExecutor {
        fn new() -> Self {
            Self {
                counts: Mutex::new(HashMap::new()),
                failing: vec![],
                items: StepId::all().iter().map(|s| (*s, 1)).collect(),
            }
        }

        fn failing(mut self, step: StepId) -> Self {
            self.failing.push(step);
            self
        }

        fn without_items(mut self, step: StepId) -> Self {
            self.items.insert(step, 0);
            self
        }

        fn count(&self, step: StepId) -> usize {
            *self.counts.lock().unwrap().get(&step).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl StepExecutor for FakeExecutor {
        fn item_count(&self, step: StepId) -> usize {
            self.items[&step]
        }

        async fn execute(&self, step: StepId) -> Result<Option<String>, SyncError> {
            *self.counts.lock().unwrap().entry(step).or_insert(0) += 1;
            if self.failing.contains(&step) {
                return Err(ApiError::RemoteUnavailable("scripted outage".into()).into());
            }
            Ok(match step {
                StepId::Artifact => Some("c1".to_string()),
                _ => None,
            })
        }
    }

    #[tokio::test]
    async fn all_steps_succeed_in_order() {
        let executor = FakeExecutor::new();
        let mut state = AttemptState::new();

        let outcome = run_steps(&mut state, StepId::Artifact, &executor).await;

        assert_eq!(outcome.halted_on, None);
        assert!(outcome.newly_completed);
        assert!(state.is_complete());
        assert_eq!(state.commit_sha.as_deref(), Some("c1"));
        for step in StepId::all() {
            assert_eq!(executor.count(*step), 1);
        }
    }

    #[tokio::test]
    async fn artifact_failure_halts_before_variables_and_secrets() {
        let executor = FakeExecutor::new().failing(StepId::Artifact);
        let mut state = AttemptState::new();

        let outcome = run_steps(&mut state, StepId::Artifact, &executor).await;

        assert_eq!(outcome.halted_on, Some(StepId::Artifact));
        assert_eq!(state.record(StepId::Artifact).state, StepState::Error);
        assert!(state.record(StepId::Artifact).last_error.is_some());
        assert_eq!(state.record(StepId::Variables).state, StepState::Pending);
        assert_eq!(state.record(StepId::Secrets).state, StepState::Pending);
        assert_eq!(executor.count(StepId::Variables), 0);
        assert_eq!(executor.count(StepId::Secrets), 0);
    }

    #[tokio::test]
    async fn retry_resumes_from_the_failed_step_only() {
        let failing = FakeExecutor::new().failing(StepId::Variables);
        let mut state = AttemptState::new();
        let outcome = run_steps(&mut state, StepId::Artifact, &failing).await;
        assert_eq!(outcome.halted_on, Some(StepId::Variables));
        assert_eq!(state.record(StepId::Artifact).state, StepState::Success);
        assert_eq!(state.record(StepId::Secrets).state, StepState::Pending);

        let healthy = FakeExecutor::new();
        let outcome = retry(&mut state, StepId::Variables, &healthy).await;

        assert_eq!(outcome.halted_on, None);
        assert!(outcome.newly_completed);
        assert_eq!(healthy.count(StepId::Artifact), 0, "success is not re-run");
        assert_eq!(healthy.count(StepId::Variables), 1);
        assert_eq!(healthy.count(StepId::Secrets), 1);
        assert!(state.is_complete());
    }

    #[tokio::test]
    async fn zero_item_step_is_vacuously_successful() {
        let executor = FakeExecutor::new()
            .without_items(StepId::Variables)
            .without_items(StepId::Secrets);
        let mut state = AttemptState::new();

        let outcome = run_steps(&mut state, StepId::Artifact, &executor).await;

        assert!(outcome.newly_completed);
        assert_eq!(executor.count(StepId::Variables), 0);
        assert_eq!(executor.count(StepId::Secrets), 0);
        assert_eq!(state.record(StepId::Variables).state, StepState::Success);
        assert_eq!(state.record(StepId::Secrets).state, StepState::Success);
    }

    #[tokio::test]
    async fn completion_is_signalled_exactly_once() {
        let executor = FakeExecutor::new();
        let mut state = AttemptState::new();

        let first = run_steps(&mut state, StepId::Artifact, &executor).await;
        assert!(first.newly_completed);
        let completed_at = state.completed_at;

        let second = run_steps(&mut state, StepId::Artifact, &executor).await;
        assert!(!second.newly_completed, "already-complete state must not re-signal");
        assert_eq!(state.completed_at, completed_at);
    }

    #[tokio::test]
    async fn start_is_clamped_back_to_the_first_incomplete_step() {
        let failing = FakeExecutor::new().failing(StepId::Variables);
        let mut state = AttemptState::new();
        run_steps(&mut state, StepId::Artifact, &failing).await;

        // Asking to retry `secrets` while `variables` is still in error must
        // not skip the unapplied variables.
        let healthy = FakeExecutor::new();
        let outcome = run_steps(&mut state, StepId::Secrets, &healthy).await;

        assert_eq!(outcome.halted_on, None);
        assert_eq!(healthy.count(StepId::Artifact), 0);
        assert_eq!(healthy.count(StepId::Variables), 1);
        assert_eq!(healthy.count(StepId::Secrets), 1);
    }

    #[tokio::test]
    async fn unchanged_artifact_keeps_the_previous_commit_sha() {
        struct UnchangedExecutor;

        #[async_trait]
        impl StepExecutor for UnchangedExecutor {
            fn item_count(&self, _step: StepId) -> usize {
                1
            }
            async fn execute(&self, _step: StepId) -> Result<Option<String>, SyncError> {
                Ok(None)
            }
        }

        let mut state = AttemptState::new();
        state.commit_sha = Some("earlier".to_string());

        run_steps(&mut state, StepId::Artifact, &UnchangedExecutor).await;

        assert_eq!(state.commit_sha.as_deref(), Some("earlier"));
    }
}
