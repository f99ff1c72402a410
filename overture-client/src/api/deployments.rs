//! Deployments API.

use overture_core::{Deployment, DeploymentId, RepoSlug};

use crate::client::RepoHost;
use crate::error::Result;
use crate::types::DeploymentStatus;

/// Deployments API client.
pub struct DeploymentsApi {
    client: RepoHost,
}

impl DeploymentsApi {
    pub(crate) fn new(client: RepoHost) -> Self {
        Self { client }
    }

    /// List deployment records, newest first.
    pub async fn list(&self, repo: &RepoSlug) -> Result<Vec<Deployment>> {
        self.client.get(&format!("repos/{repo}/deployments")).await
    }

    /// List the status history of one deployment.
    pub async fn statuses(
        &self,
        repo: &RepoSlug,
        deployment: DeploymentId,
    ) -> Result<Vec<DeploymentStatus>> {
        self.client
            .get(&format!("repos/{repo}/deployments/{deployment}/statuses"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_deserializes_host_wire_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/api/deployments")
            .with_status(200)
            .with_body(
                r#"[{
                    "id": 7,
                    "sha": "deadbeef",
                    "ref": "main",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:05:00Z"
                }]"#,
            )
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        let deployments = host
            .deployments()
            .list(&RepoSlug::from("acme/api"))
            .await
            .expect("list");

        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].id, DeploymentId(7));
        assert_eq!(deployments[0].ref_name, "main");
        assert!(deployments[0].run_id.is_none(), "host never sets run_id");
    }
}
