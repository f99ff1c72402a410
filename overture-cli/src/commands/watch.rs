//! `overture watch` — poll a run until it reaches a terminal status.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;

use overture_core::RunId;
use overture_runs::{correlate, watch, DerivedStatus};
use overture_sync::attempt_store;

use super::{build_host, home, load_manifest};

/// Arguments for `overture watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Run to watch (defaults to the run correlated with the last
    /// provisioned commit).
    pub run_id: Option<u64>,

    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Poll interval in seconds.
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

impl WatchArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;

        let run_id = match self.run_id {
            Some(id) => RunId(id),
            None => {
                let state = attempt_store::load_at(&home()?, &manifest.repo)?;
                let Some(sha) = state.commit_sha else {
                    bail!("no run to watch — pass a run id or provision first");
                };
                match correlate(&host, &manifest.repo, &sha, None).await? {
                    Some(id) => id,
                    None => bail!("no run for commit {sha} yet — check again shortly"),
                }
            }
        };

        println!("watching run {run_id} (every {}s)…", self.interval);
        let mut last: Option<DerivedStatus> = None;
        let terminal = watch(
            &host,
            &manifest.repo,
            run_id,
            Duration::from_secs(self.interval),
            |status| {
                // Report transitions, not every identical observation.
                if last != Some(status.derived) {
                    println!("  {}", status.derived);
                    last = Some(status.derived);
                }
            },
        )
        .await?;

        if terminal.derived.can_retry() {
            println!("run {run_id} finished: {} — 'overture rerun {run_id}' to retry", terminal.derived);
        } else {
            println!("run {run_id} finished: {}", terminal.derived);
        }
        Ok(())
    }
}
