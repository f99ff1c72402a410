//! Wire types for the repository host API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// A file as read from the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// Content identifier used for conditional writes.
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

impl RemoteFile {
    /// Decode the base64 content the host returns (it inserts line breaks).
    pub fn decoded_content(&self) -> Result<String> {
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD.decode(compact).map_err(|e| ApiError::Unknown {
            status: 0,
            message: format!("undecodable file content: {e}"),
        })?;
        String::from_utf8(bytes).map_err(|e| ApiError::Unknown {
            status: 0,
            message: format!("file content is not UTF-8: {e}"),
        })
    }
}

/// Body for a conditional file write.
#[derive(Debug, Clone, Serialize)]
pub struct FileWriteBody {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    pub branch: String,
    /// Content identifier observed on read; omitted for a fresh file. The
    /// host rejects the write if this is stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl FileWriteBody {
    pub fn new(message: &str, content: &str, branch: &str, sha: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            content: STANDARD.encode(content.as_bytes()),
            branch: branch.to_string(),
            sha,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileWriteResponse {
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
}

// ---------------------------------------------------------------------------
// Variables and secrets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct VariableBody {
    pub name: String,
    pub value: String,
}

/// The repository public key secrets are sealed against. Fetched fresh per
/// attempt — keys rotate.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicKeyResponse {
    pub key_id: String,
    /// Base64 X25519 public key.
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecretWriteBody {
    pub encrypted_value: String,
    pub key_id: String,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// A CI run as listed by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Workflow definition path, e.g. `.github/workflows/deploy.yml`.
    #[serde(default)]
    pub path: Option<String>,
    pub head_sha: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunsListResponse {
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchBody {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

/// A status entry attached to a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatus {
    pub id: u64,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_file_decodes_wrapped_base64() {
        let file = RemoteFile {
            sha: "abc".to_string(),
            // "name: test\non: push" split across lines, as the host wraps it
            content: "bmFtZTogdGVzdApv\nbjogcHVzaA==\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(file.decoded_content().expect("decode"), "name: test\non: push");
    }

    #[test]
    fn file_write_body_encodes_and_omits_missing_sha() {
        let body = FileWriteBody::new("msg", "hello", "main", None);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["content"], "aGVsbG8=");
        assert!(json.get("sha").is_none());

        let with_sha = FileWriteBody::new("msg", "hello", "main", Some("deadbeef".into()));
        let json = serde_json::to_value(&with_sha).expect("serialize");
        assert_eq!(json["sha"], "deadbeef");
    }

    #[test]
    fn dispatch_body_uses_ref_wire_name() {
        let body = DispatchBody {
            ref_name: "main".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["ref"], "main");
    }
}
