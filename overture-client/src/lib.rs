//! # overture-client
//!
//! Async client for a GitHub-compatible repository host: contents, variables,
//! secrets, CI runs, and deployments, with a typed error taxonomy that the
//! provisioning pipeline routes on.

pub mod api;
mod client;
pub mod error;
pub mod types;

pub use api::{ContentsApi, DeploymentsApi, RunsApi, SecretsApi, VariablesApi};
pub use client::{HostBuilder, RepoHost};
pub use error::{ApiError, Result};
pub use types::{
    DeploymentStatus, FileWriteBody, FileWriteResponse, PublicKeyResponse, RemoteFile,
    RunsListResponse, WorkflowRun,
};
