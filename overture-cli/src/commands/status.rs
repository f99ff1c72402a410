//! `overture status` — per-step provisioning state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use overture_core::{AttemptState, StepState};
use overture_sync::attempt_store;

use super::{home, load_manifest};

/// Arguments for `overture status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct StepTableRow {
    #[tabled(rename = "step")]
    step: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    repo: String,
    complete: bool,
    #[serde(flatten)]
    state: &'a AttemptState,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let home = home()?;
        let state = attempt_store::load_at(&home, &manifest.repo)
            .with_context(|| format!("failed to load attempt state for '{}'", manifest.repo))?;

        if self.json {
            let payload = StatusJson {
                repo: manifest.repo.to_string(),
                complete: state.is_complete(),
                state: &state,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&manifest.repo.to_string(), &state);
        Ok(())
    }
}

fn print_table(repo: &str, state: &AttemptState) {
    let headline = if state.is_complete() {
        "provisioned".green().to_string()
    } else if state.first_error().is_some() {
        "halted".red().to_string()
    } else {
        "incomplete".yellow().to_string()
    };
    println!("{} — {headline}", repo.bold());
    if let Some(sha) = &state.commit_sha {
        println!("workflow commit: {sha}");
    }
    if let Some(completed_at) = state.completed_at {
        println!("completed: {}", completed_at.to_rfc3339());
    }

    let rows: Vec<StepTableRow> = state
        .steps
        .iter()
        .map(|record| StepTableRow {
            step: record.step.to_string(),
            state: state_label(record.state).to_string(),
            detail: record.last_error.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if let Some(step) = state.first_error() {
        println!("Run 'overture retry {step}' to resume.");
    }
}

fn state_label(state: StepState) -> &'static str {
    match state {
        StepState::Pending => "PENDING",
        StepState::InProgress => "IN PROGRESS",
        StepState::Success => "SUCCESS",
        StepState::Error => "ERROR",
    }
}
