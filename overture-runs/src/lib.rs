//! # overture-runs
//!
//! Run-side reconciliation for the provisioning pipeline: joining
//! deployments to the CI runs their commits triggered, normalizing
//! heterogeneous run states, polling until terminal, and streaming run
//! logs.

pub mod correlate;
pub mod logs;
pub mod poll;
pub mod status;

pub use correlate::{correlate, correlate_deployment};
pub use logs::LogStream;
pub use poll::{watch, watch_with, DEFAULT_POLL_INTERVAL};
pub use status::{DerivedStatus, RerunMode, RunStatus};
