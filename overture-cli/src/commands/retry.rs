//! `overture retry` — resume provisioning from a failed step.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use overture_core::StepId;
use overture_sync::{attempt_store, pipeline};

use super::{build_host, home, load_manifest, print_steps};

/// Arguments for `overture retry`.
#[derive(Args, Debug)]
pub struct RetryArgs {
    /// Step to retry from (defaults to the first failed step).
    pub step: Option<StepId>,

    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl RetryArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let home = home()?;
        let mut state = attempt_store::load_at(&home, &manifest.repo)?;

        let from = match self.step.or_else(|| state.first_error()) {
            Some(step) => step,
            None => bail!(
                "nothing to retry for '{}' — no step is in error",
                manifest.repo
            ),
        };

        let host = build_host()?;
        let outcome = pipeline::run(&host, &manifest, &mut state, from).await?;
        attempt_store::save_at(&home, &manifest.repo, &state)?;

        print_steps(&state);
        if let Some(step) = outcome.halted_on {
            let error = state
                .record(step)
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("retry halted at '{step}': {error}");
        }

        if outcome.newly_completed {
            println!("✓ '{}' provisioned", manifest.repo);
        } else {
            println!("✓ '{}' — steps re-applied", manifest.repo);
        }
        Ok(())
    }
}
