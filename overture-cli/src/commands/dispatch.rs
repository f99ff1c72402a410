//! `overture dispatch` — manually trigger the provisioned workflow.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::{build_host, load_manifest};

/// Arguments for `overture dispatch`.
#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Git ref to run on (defaults to the manifest branch).
    #[arg(long)]
    pub r#ref: Option<String>,
}

impl DispatchArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;

        // The host addresses dispatchable workflows by file name.
        let workflow = workflow_file_name(&manifest.workflow.path)
            .context("workflow path has no file name")?;
        let ref_name = self.r#ref.unwrap_or_else(|| manifest.branch.clone());

        host.runs()
            .dispatch(&manifest.repo, workflow, &ref_name)
            .await?;
        println!("✓ dispatched '{workflow}' on '{ref_name}'");
        Ok(())
    }
}

fn workflow_file_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_the_last_path_segment() {
        assert_eq!(
            workflow_file_name(".github/workflows/deploy.yml"),
            Some("deploy.yml")
        );
        assert_eq!(workflow_file_name("deploy.yml"), Some("deploy.yml"));
        assert_eq!(workflow_file_name(".github/workflows/"), None);
    }
}
