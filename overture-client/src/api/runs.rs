//! CI runs API — listing, control, and log download.

use overture_core::{RepoSlug, RunId};

use crate::client::RepoHost;
use crate::error::Result;
use crate::types::{DispatchBody, RunsListResponse, WorkflowRun};

/// Runs API client.
pub struct RunsApi {
    client: RepoHost,
}

impl RunsApi {
    pub(crate) fn new(client: RepoHost) -> Self {
        Self { client }
    }

    /// List runs whose head commit matches `head_sha`, newest first.
    pub async fn list_for_commit(
        &self,
        repo: &RepoSlug,
        head_sha: &str,
    ) -> Result<Vec<WorkflowRun>> {
        let response: RunsListResponse = self
            .client
            .get_with_query(
                &format!("repos/{repo}/actions/runs"),
                &[("head_sha", head_sha)],
            )
            .await?;
        Ok(response.workflow_runs)
    }

    /// Fetch a single run.
    pub async fn get(&self, repo: &RepoSlug, run: RunId) -> Result<WorkflowRun> {
        self.client
            .get(&format!("repos/{repo}/actions/runs/{run}"))
            .await
    }

    /// Rerun the whole run.
    pub async fn rerun(&self, repo: &RepoSlug, run: RunId) -> Result<()> {
        self.client
            .post_empty(&format!("repos/{repo}/actions/runs/{run}/rerun"))
            .await
    }

    /// Rerun only the failed jobs of a run.
    pub async fn rerun_failed_jobs(&self, repo: &RepoSlug, run: RunId) -> Result<()> {
        self.client
            .post_empty(&format!("repos/{repo}/actions/runs/{run}/rerun-failed-jobs"))
            .await
    }

    /// Cancel an in-flight run.
    pub async fn cancel(&self, repo: &RepoSlug, run: RunId) -> Result<()> {
        self.client
            .post_empty(&format!("repos/{repo}/actions/runs/{run}/cancel"))
            .await
    }

    /// Trigger a workflow on `ref_name` via the dispatch endpoint.
    pub async fn dispatch(&self, repo: &RepoSlug, workflow: &str, ref_name: &str) -> Result<()> {
        self.client
            .post_unit(
                &format!("repos/{repo}/actions/workflows/{workflow}/dispatches"),
                &DispatchBody {
                    ref_name: ref_name.to_string(),
                },
            )
            .await
    }

    /// Open the run-log download as a raw streaming response.
    ///
    /// The host answers with an opaque archive (following its redirect);
    /// the bytes are forwarded verbatim, never extracted here.
    pub async fn logs(&self, repo: &RepoSlug, run: RunId) -> Result<reqwest::Response> {
        self.client
            .get_stream(&format!("repos/{repo}/actions/runs/{run}/logs"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_for_commit_filters_by_head_sha() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/api/actions/runs?head_sha=deadbeef")
            .with_status(200)
            .with_body(
                r#"{"workflow_runs":[{
                    "id": 42,
                    "name": "Deploy",
                    "path": ".github/workflows/deploy.yml",
                    "head_sha": "deadbeef",
                    "status": "completed",
                    "conclusion": "success",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:10:00Z"
                }]}"#,
            )
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        let runs = host
            .runs()
            .list_for_commit(&RepoSlug::from("acme/api"), "deadbeef")
            .await
            .expect("list");

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 42);
        assert_eq!(runs[0].conclusion.as_deref(), Some("success"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn control_endpoints_tolerate_empty_bodies() {
        let mut server = mockito::Server::new_async().await;
        let rerun = server
            .mock("POST", "/repos/acme/api/actions/runs/42/rerun-failed-jobs")
            .with_status(201)
            .create_async()
            .await;
        let cancel = server
            .mock("POST", "/repos/acme/api/actions/runs/42/cancel")
            .with_status(202)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        let repo = RepoSlug::from("acme/api");
        host.runs()
            .rerun_failed_jobs(&repo, RunId(42))
            .await
            .expect("rerun");
        host.runs().cancel(&repo, RunId(42)).await.expect("cancel");

        rerun.assert_async().await;
        cancel.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_posts_the_target_ref() {
        let mut server = mockito::Server::new_async().await;
        let dispatch = server
            .mock(
                "POST",
                "/repos/acme/api/actions/workflows/deploy.yml/dispatches",
            )
            .match_body(mockito::Matcher::Json(serde_json::json!({ "ref": "main" })))
            .with_status(204)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        host.runs()
            .dispatch(&RepoSlug::from("acme/api"), "deploy.yml", "main")
            .await
            .expect("dispatch");

        dispatch.assert_async().await;
    }
}
