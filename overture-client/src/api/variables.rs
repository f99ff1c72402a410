//! Repository variables API.

use overture_core::{ConfigVariable, RepoSlug};

use crate::client::RepoHost;
use crate::error::Result;
use crate::types::VariableBody;

/// Variables API client.
pub struct VariablesApi {
    client: RepoHost,
}

impl VariablesApi {
    pub(crate) fn new(client: RepoHost) -> Self {
        Self { client }
    }

    /// Update an existing variable. Fails with `NotFound` when the variable
    /// does not exist yet — the propagator falls back to [`Self::create`].
    pub async fn update(&self, repo: &RepoSlug, variable: &ConfigVariable) -> Result<()> {
        self.client
            .patch_unit(
                &format!("repos/{repo}/actions/variables/{}", variable.name),
                &VariableBody {
                    name: variable.name.to_string(),
                    value: variable.value.clone(),
                },
            )
            .await
    }

    /// Create a new variable.
    pub async fn create(&self, repo: &RepoSlug, variable: &ConfigVariable) -> Result<()> {
        self.client
            .post_unit(
                &format!("repos/{repo}/actions/variables"),
                &VariableBody {
                    name: variable.name.to_string(),
                    value: variable.value.clone(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overture_core::VariableName;

    #[tokio::test]
    async fn update_of_missing_variable_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/repos/acme/api/actions/variables/NODE_VERSION")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        let err = host
            .variables()
            .update(
                &RepoSlug::from("acme/api"),
                &ConfigVariable {
                    name: VariableName::from("NODE_VERSION"),
                    value: "20".to_string(),
                },
            )
            .await
            .expect_err("missing variable");

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn create_posts_name_and_value() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/api/actions/variables")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "name": "NODE_VERSION",
                "value": "20"
            })))
            .with_status(201)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        host.variables()
            .create(
                &RepoSlug::from("acme/api"),
                &ConfigVariable {
                    name: VariableName::from("NODE_VERSION"),
                    value: "20".to_string(),
                },
            )
            .await
            .expect("create");

        mock.assert_async().await;
    }
}
