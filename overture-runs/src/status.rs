//! Run status reconciliation.
//!
//! The host reports a raw `(status, conclusion)` pair whose vocabulary is
//! not ours to control. This module normalizes it into one [`DerivedStatus`]
//! that drives polling, retry, and cancel eligibility. The derived value is
//! recomputed on every poll and never stored back to the host.

use serde::{Deserialize, Serialize};

use overture_client::WorkflowRun;
use overture_core::RunId;

/// Normalized run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    Queued,
    InProgress,
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    Neutral,
    ActionRequired,
    /// Completed with a conclusion we do not recognize (or none at all).
    Completed,
    /// An external status outside the known vocabulary.
    Unknown,
}

impl DerivedStatus {
    /// Map a raw external `(status, conclusion)` pair.
    ///
    /// Total over all inputs: unrecognized statuses become [`Self::Unknown`],
    /// never a panic.
    pub fn derive(status: &str, conclusion: Option<&str>) -> Self {
        match status {
            "queued" => DerivedStatus::Queued,
            "in_progress" => DerivedStatus::InProgress,
            "completed" => match conclusion {
                Some("success") => DerivedStatus::Success,
                Some("failure") => DerivedStatus::Failure,
                Some("cancelled") => DerivedStatus::Cancelled,
                Some("skipped") => DerivedStatus::Skipped,
                Some("timed_out") => DerivedStatus::TimedOut,
                Some("neutral") => DerivedStatus::Neutral,
                Some("action_required") => DerivedStatus::ActionRequired,
                _ => DerivedStatus::Completed,
            },
            _ => DerivedStatus::Unknown,
        }
    }

    /// Still executing (or waiting to) — the only states worth polling.
    pub fn is_active(&self) -> bool {
        matches!(self, DerivedStatus::Queued | DerivedStatus::InProgress)
    }

    /// Eligible for a rerun.
    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            DerivedStatus::Failure | DerivedStatus::Cancelled | DerivedStatus::TimedOut
        )
    }

    /// Eligible for cancellation.
    pub fn can_cancel(&self) -> bool {
        self.is_active()
    }

    /// How a retry should rerun the run. A plain failure reruns only the
    /// failed jobs; anything else reruns the whole run.
    pub fn rerun_mode(&self) -> RerunMode {
        match self {
            DerivedStatus::Failure => RerunMode::FailedJobsOnly,
            _ => RerunMode::Full,
        }
    }
}

/// Scope of a rerun request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunMode {
    FailedJobsOnly,
    Full,
}

impl std::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DerivedStatus::Queued => "queued",
            DerivedStatus::InProgress => "in progress",
            DerivedStatus::Success => "success",
            DerivedStatus::Failure => "failure",
            DerivedStatus::Cancelled => "cancelled",
            DerivedStatus::Skipped => "skipped",
            DerivedStatus::TimedOut => "timed out",
            DerivedStatus::Neutral => "neutral",
            DerivedStatus::ActionRequired => "action required",
            DerivedStatus::Completed => "completed",
            DerivedStatus::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// One reconciled observation of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub run_id: RunId,
    pub external_status: String,
    pub external_conclusion: Option<String>,
    pub derived: DerivedStatus,
}

impl RunStatus {
    pub fn from_run(run: &WorkflowRun) -> Self {
        Self {
            run_id: RunId(run.id),
            derived: DerivedStatus::derive(&run.status, run.conclusion.as_deref()),
            external_status: run.status.clone(),
            external_conclusion: run.conclusion.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_table_is_complete() {
        let table: &[(&str, Option<&str>, DerivedStatus)] = &[
            ("queued", None, DerivedStatus::Queued),
            ("in_progress", None, DerivedStatus::InProgress),
            ("completed", Some("success"), DerivedStatus::Success),
            ("completed", Some("failure"), DerivedStatus::Failure),
            ("completed", Some("cancelled"), DerivedStatus::Cancelled),
            ("completed", Some("skipped"), DerivedStatus::Skipped),
            ("completed", Some("timed_out"), DerivedStatus::TimedOut),
            ("completed", Some("neutral"), DerivedStatus::Neutral),
            (
                "completed",
                Some("action_required"),
                DerivedStatus::ActionRequired,
            ),
            ("completed", Some("stale"), DerivedStatus::Completed),
            ("completed", None, DerivedStatus::Completed),
        ];
        for (status, conclusion, expected) in table {
            assert_eq!(
                DerivedStatus::derive(status, *conclusion),
                *expected,
                "({status}, {conclusion:?})"
            );
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown_without_panicking() {
        assert_eq!(DerivedStatus::derive("waiting", None), DerivedStatus::Unknown);
        assert_eq!(DerivedStatus::derive("requested", None), DerivedStatus::Unknown);
        assert_eq!(
            DerivedStatus::derive("", Some("success")),
            DerivedStatus::Unknown
        );
    }

    #[test]
    fn retry_eligibility_is_exactly_the_three_retryable_outcomes() {
        let retryable = [
            DerivedStatus::Failure,
            DerivedStatus::Cancelled,
            DerivedStatus::TimedOut,
        ];
        let not_retryable = [
            DerivedStatus::Queued,
            DerivedStatus::InProgress,
            DerivedStatus::Success,
            DerivedStatus::Skipped,
            DerivedStatus::Neutral,
            DerivedStatus::ActionRequired,
            DerivedStatus::Completed,
            DerivedStatus::Unknown,
        ];
        for status in retryable {
            assert!(status.can_retry(), "{status} should be retryable");
        }
        for status in not_retryable {
            assert!(!status.can_retry(), "{status} should not be retryable");
        }
    }

    #[test]
    fn failure_reruns_only_failed_jobs() {
        assert_eq!(
            DerivedStatus::Failure.rerun_mode(),
            RerunMode::FailedJobsOnly
        );
        assert_eq!(DerivedStatus::Cancelled.rerun_mode(), RerunMode::Full);
        assert_eq!(DerivedStatus::TimedOut.rerun_mode(), RerunMode::Full);
    }

    #[test]
    fn only_queued_and_in_progress_are_active() {
        assert!(DerivedStatus::Queued.is_active());
        assert!(DerivedStatus::InProgress.is_active());
        assert!(!DerivedStatus::Success.is_active());
        assert!(!DerivedStatus::Unknown.is_active());
    }
}
