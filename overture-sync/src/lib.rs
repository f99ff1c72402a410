//! # overture-sync
//!
//! The provisioning pipeline: compare-and-swap workflow file upsert,
//! variable/secret propagation, and resumable step orchestration.
//!
//! Call [`pipeline::run`] to provision a manifest against the host, or
//! [`steps::retry`] with a stored [`overture_core::AttemptState`] to resume
//! from a failed step.

pub mod attempt_store;
pub mod error;
pub mod pipeline;
pub mod propagate;
pub mod steps;
pub mod upsert;

pub use error::SyncError;
pub use pipeline::HostExecutor;
pub use steps::{retry, run_steps, RunOutcome, StepExecutor};
pub use upsert::{upsert_file, UpsertOutcome};
