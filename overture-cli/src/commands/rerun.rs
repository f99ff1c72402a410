//! `overture rerun` — rerun an eligible run.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use overture_core::RunId;
use overture_runs::{RerunMode, RunStatus};

use super::{build_host, load_manifest};

/// Arguments for `overture rerun`.
#[derive(Args, Debug)]
pub struct RerunArgs {
    /// Run to rerun.
    pub run_id: u64,

    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl RerunArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;
        let run_id = RunId(self.run_id);

        let run = host.runs().get(&manifest.repo, run_id).await?;
        let status = RunStatus::from_run(&run);
        if !status.derived.can_retry() {
            bail!(
                "run {run_id} is '{}' — only failed, cancelled, or timed-out runs can be rerun",
                status.derived
            );
        }

        match status.derived.rerun_mode() {
            RerunMode::FailedJobsOnly => {
                host.runs().rerun_failed_jobs(&manifest.repo, run_id).await?;
                println!("✓ rerunning failed jobs of run {run_id}");
            }
            RerunMode::Full => {
                host.runs().rerun(&manifest.repo, run_id).await?;
                println!("✓ rerunning run {run_id}");
            }
        }
        Ok(())
    }
}
