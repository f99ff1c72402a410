//! `overture cancel` — cancel an in-flight run.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use overture_core::RunId;
use overture_runs::RunStatus;

use super::{build_host, load_manifest};

/// Arguments for `overture cancel`.
#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Run to cancel.
    pub run_id: u64,

    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl CancelArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;
        let run_id = RunId(self.run_id);

        let run = host.runs().get(&manifest.repo, run_id).await?;
        let status = RunStatus::from_run(&run);
        if !status.derived.can_cancel() {
            bail!(
                "run {run_id} is '{}' — only queued or in-progress runs can be cancelled",
                status.derived
            );
        }

        host.runs().cancel(&manifest.repo, run_id).await?;
        println!("✓ cancel requested for run {run_id}");
        Ok(())
    }
}
