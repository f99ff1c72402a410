//! Repository contents API — conditional reads and writes of single files.

use overture_core::RepoSlug;

use crate::client::RepoHost;
use crate::error::Result;
use crate::types::{FileWriteBody, FileWriteResponse, RemoteFile};

/// Contents API client.
pub struct ContentsApi {
    client: RepoHost,
}

impl ContentsApi {
    pub(crate) fn new(client: RepoHost) -> Self {
        Self { client }
    }

    /// Read the file at `path@ref`.
    ///
    /// Absence is an expected, distinguishable outcome — it returns
    /// `Ok(None)`, never an error. Any other failure propagates.
    pub async fn get_file(
        &self,
        repo: &RepoSlug,
        path: &str,
        ref_name: &str,
    ) -> Result<Option<RemoteFile>> {
        let result = self
            .client
            .get_with_query::<RemoteFile, _>(
                &format!("repos/{repo}/contents/{path}"),
                &[("ref", ref_name)],
            )
            .await;
        match result {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Conditionally write the file at `path`.
    ///
    /// When `body.sha` is stale the host rejects the write and this returns
    /// `ApiError::Conflict` — it never silently overwrites concurrent edits.
    pub async fn put_file(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &FileWriteBody,
    ) -> Result<FileWriteResponse> {
        self.client
            .put(&format!("repos/{repo}/contents/{path}"), body)
            .await
    }
}
