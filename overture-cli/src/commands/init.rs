//! `overture init` — scaffold a provisioning manifest.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use overture_core::{
    manifest::{self, Manifest, WorkflowSpec},
    RepoSlug,
};

/// Arguments for `overture init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Target repository as an owner/name slug.
    pub repo: String,

    /// Branch the workflow file is committed to.
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// In-repository path for the workflow file.
    #[arg(long, default_value = ".github/workflows/deploy.yml")]
    pub workflow_path: String,

    /// Local file holding the generated workflow text.
    #[arg(long, default_value = "./workflow.yml")]
    pub source: PathBuf,

    /// Where to write the manifest.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Overwrite an existing manifest.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let repo = RepoSlug::from(self.repo.as_str());
        if repo.parts().is_none() {
            bail!("'{}' is not an owner/name slug", self.repo);
        }

        let path = super::manifest_path(&self.manifest);
        if path.exists() && !self.force {
            bail!(
                "'{}' already exists — pass --force to overwrite",
                path.display()
            );
        }

        let scaffold = Manifest {
            repo,
            branch: self.branch,
            workflow: WorkflowSpec {
                path: self.workflow_path,
                source: self.source,
                commit_message: None,
            },
            variables: Default::default(),
            secrets: vec![],
        };
        manifest::save(&path, &scaffold)
            .with_context(|| format!("failed to write '{}'", path.display()))?;

        println!("✓ wrote {}", path.display());
        println!("Add variables and secret names, then run 'overture provision'.");
        Ok(())
    }
}
