//! CLI subcommands and shared plumbing.

pub mod cancel;
pub mod dispatch;
pub mod exec;
pub mod init;
pub mod logs;
pub mod provision;
pub mod rerun;
pub mod retry;
pub mod runs;
pub mod status;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use overture_client::RepoHost;
use overture_core::{manifest, manifest::Manifest, AttemptState, StepState};

/// Environment variables consulted for host access.
const TOKEN_VARS: &[&str] = &["OVERTURE_TOKEN", "GITHUB_TOKEN"];
const API_URL_VAR: &str = "OVERTURE_API_URL";

/// Resolve the manifest path: explicit flag or `./overture.yaml`.
pub(crate) fn manifest_path(arg: &Option<PathBuf>) -> PathBuf {
    arg.clone()
        .unwrap_or_else(|| PathBuf::from(manifest::DEFAULT_MANIFEST))
}

/// Load the manifest named by `--manifest` (or the default path).
pub(crate) fn load_manifest(arg: &Option<PathBuf>) -> Result<Manifest> {
    let path = manifest_path(arg);
    manifest::load(&path)
        .with_context(|| format!("failed to load manifest '{}'", path.display()))
}

/// Build the host client from the environment.
pub(crate) fn build_host() -> Result<RepoHost> {
    let token = TOKEN_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|t| !t.is_empty()))
        .with_context(|| format!("no host token; set {}", TOKEN_VARS.join(" or ")))?;

    let mut builder = RepoHost::builder().token(token);
    if let Ok(base_url) = std::env::var(API_URL_VAR) {
        builder = builder.base_url(base_url);
    }
    builder.build().context("failed to build host client")
}

/// Home directory for the attempt store.
pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// One line per step, shared by every command that prints attempt state.
pub(crate) fn print_steps(state: &AttemptState) {
    for record in &state.steps {
        let (symbol, label) = match record.state {
            StepState::Success => ("✓".green(), "success".green()),
            StepState::Error => ("✗".red(), "error".red()),
            StepState::InProgress => ("…".yellow(), "in progress".yellow()),
            StepState::Pending => ("·".bright_black(), "pending".bright_black()),
        };
        match &record.last_error {
            Some(error) if record.state == StepState::Error => {
                println!("  {symbol} {:<9} — {label}: {error}", record.step.to_string());
            }
            _ => println!("  {symbol} {:<9} — {label}", record.step.to_string()),
        }
    }
}
