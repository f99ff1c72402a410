//! API endpoint implementations.

mod contents;
mod deployments;
mod runs;
mod secrets;
mod variables;

pub use contents::ContentsApi;
pub use deployments::DeploymentsApi;
pub use runs::RunsApi;
pub use secrets::SecretsApi;
pub use variables::VariablesApi;
