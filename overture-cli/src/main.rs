//! Overture — CI workflow provisioning CLI.
//!
//! # Usage
//!
//! ```text
//! overture init <owner/repo> [--branch main] [--workflow-path <path>]
//! overture provision [--manifest overture.yaml] [--from <step>] [--dry-run]
//! overture retry [<step>]
//! overture status [--json]
//! overture runs [--sha <commit>] [--path <hint>] [--deployments]
//! overture watch [<run-id>] [--interval <seconds>]
//! overture logs <run-id> [--output <file>]
//! overture rerun <run-id>
//! overture cancel <run-id>
//! overture dispatch [--ref <ref>]
//! overture exec -- <tool> <read-only subcommand...>
//! ```
//!
//! The host token is read from `OVERTURE_TOKEN` (falling back to
//! `GITHUB_TOKEN`); `OVERTURE_API_URL` overrides the API base URL.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    cancel::CancelArgs, dispatch::DispatchArgs, exec::ExecArgs, init::InitArgs, logs::LogsArgs,
    provision::ProvisionArgs, rerun::RerunArgs, retry::RetryArgs, runs::RunsArgs,
    status::StatusArgs, watch::WatchArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "overture",
    version,
    about = "Provision generated CI workflows, variables, and sealed secrets to a repository host",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold a provisioning manifest for a repository.
    Init(InitArgs),

    /// Commit the workflow file and propagate variables and secrets.
    Provision(ProvisionArgs),

    /// Re-run provisioning from a failed step without repeating successes.
    Retry(RetryArgs),

    /// Show per-step provisioning state for the manifest's repository.
    Status(StatusArgs),

    /// Correlate commits and deployments to CI runs and show run status.
    Runs(RunsArgs),

    /// Poll a run until it reaches a terminal status.
    Watch(WatchArgs),

    /// Stream a run's log archive to a file or stdout.
    Logs(LogsArgs),

    /// Rerun an eligible run (failed jobs only after a plain failure).
    Rerun(RerunArgs),

    /// Cancel an in-flight run.
    Cancel(CancelArgs),

    /// Manually trigger the provisioned workflow on a ref.
    Dispatch(DispatchArgs),

    /// Run an allowlisted read-only command against an external tool.
    Exec(ExecArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Provision(args) => args.run().await,
        Commands::Retry(args) => args.run().await,
        Commands::Status(args) => args.run(),
        Commands::Runs(args) => args.run().await,
        Commands::Watch(args) => args.run().await,
        Commands::Logs(args) => args.run().await,
        Commands::Rerun(args) => args.run().await,
        Commands::Cancel(args) => args.run().await,
        Commands::Dispatch(args) => args.run().await,
        Commands::Exec(args) => args.run(),
    }
}
