//! `overture provision` — apply the manifest to the repository host.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use overture_core::StepId;
use overture_sync::{attempt_store, pipeline};

use super::{build_host, home, load_manifest, print_steps};

/// Arguments for `overture provision`.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Start from this step, keeping earlier successes.
    #[arg(long)]
    pub from: Option<StepId>,

    /// Print the provisioning plan without contacting the host.
    #[arg(long)]
    pub dry_run: bool,
}

impl ProvisionArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;

        if self.dry_run {
            print_plan(&manifest);
            return Ok(());
        }

        let host = build_host()?;
        let home = home()?;
        let mut state = attempt_store::load_at(&home, &manifest.repo)?;
        let from = self.from.unwrap_or(StepId::Artifact);

        let outcome = pipeline::run(&host, &manifest, &mut state, from).await?;
        // Persist whatever happened so a later `retry` can resume.
        attempt_store::save_at(&home, &manifest.repo, &state)?;

        print_steps(&state);
        if let Some(step) = outcome.halted_on {
            let error = state
                .record(step)
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("provisioning halted at '{step}': {error}\nfix the cause and run `overture retry {step}`");
        }

        if outcome.newly_completed {
            match &state.commit_sha {
                Some(sha) => println!("✓ '{}' provisioned (commit {sha})", manifest.repo),
                None => println!("✓ '{}' provisioned", manifest.repo),
            }
        } else {
            println!("✓ '{}' — nothing to do", manifest.repo);
        }
        Ok(())
    }
}

fn print_plan(manifest: &overture_core::manifest::Manifest) {
    println!(
        "[dry-run] would provision '{}' on branch '{}':",
        manifest.repo, manifest.branch
    );
    println!(
        "  ~ commit {} (from {})",
        manifest.workflow.path,
        manifest.workflow.source.display()
    );
    for name in manifest.variables.keys() {
        println!("  ~ variable {name}");
    }
    for name in &manifest.secrets {
        let value = std::env::var(name).unwrap_or_default();
        if value.is_empty() {
            println!("  ! secret {name} (empty — would be skipped)");
        } else {
            println!("  ~ secret {name} (sealed)");
        }
    }
}
