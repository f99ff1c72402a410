//! Repository secrets API.
//!
//! Only sealed material crosses this surface: the write endpoint takes
//! ciphertext plus the identifier of the key it was sealed against, never
//! plaintext.

use overture_core::{RepoSlug, SealedSecret};

use crate::client::RepoHost;
use crate::error::Result;
use crate::types::{PublicKeyResponse, SecretWriteBody};

/// Secrets API client.
pub struct SecretsApi {
    client: RepoHost,
}

impl SecretsApi {
    pub(crate) fn new(client: RepoHost) -> Self {
        Self { client }
    }

    /// Fetch the repository's current sealing key. Callers fetch this fresh
    /// per attempt — keys rotate and must never be cached across attempts.
    pub async fn public_key(&self, repo: &RepoSlug) -> Result<PublicKeyResponse> {
        self.client
            .get(&format!("repos/{repo}/actions/secrets/public-key"))
            .await
    }

    /// Upsert a sealed secret. The host treats this as create-or-update.
    pub async fn put(&self, repo: &RepoSlug, secret: &SealedSecret) -> Result<()> {
        self.client
            .put_unit(
                &format!("repos/{repo}/actions/secrets/{}", secret.name),
                &SecretWriteBody {
                    encrypted_value: secret.ciphertext.clone(),
                    key_id: secret.key_id.clone(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overture_core::SecretName;

    #[tokio::test]
    async fn public_key_round_trip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/api/actions/secrets/public-key")
            .with_status(200)
            .with_body(r#"{"key_id":"568250167242549743","key":"dGVzdC1rZXk="}"#)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        let key = host
            .secrets()
            .public_key(&RepoSlug::from("acme/api"))
            .await
            .expect("key");

        assert_eq!(key.key_id, "568250167242549743");
        assert_eq!(key.key, "dGVzdC1rZXk=");
    }

    #[tokio::test]
    async fn put_sends_ciphertext_and_key_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/api/actions/secrets/DEPLOY_TOKEN")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "encrypted_value": "c2VhbGVk",
                "key_id": "568250167242549743"
            })))
            .with_status(204)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build");
        host.secrets()
            .put(
                &RepoSlug::from("acme/api"),
                &SealedSecret {
                    name: SecretName::from("DEPLOY_TOKEN"),
                    ciphertext: "c2VhbGVk".to_string(),
                    key_id: "568250167242549743".to_string(),
                },
            )
            .await
            .expect("put");

        mock.assert_async().await;
    }
}
