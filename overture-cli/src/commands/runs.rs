//! `overture runs` — correlate commits and deployments to CI runs.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use overture_client::RepoHost;
use overture_core::RepoSlug;
use overture_runs::{correlate, correlate_deployment, RunStatus};
use overture_sync::attempt_store;

use super::{build_host, home, load_manifest};

/// Arguments for `overture runs`.
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Commit to correlate (defaults to the last provisioned commit).
    #[arg(long)]
    pub sha: Option<String>,

    /// Keep only runs whose workflow path contains this substring.
    #[arg(long)]
    pub path: Option<String>,

    /// List recent deployments with their correlated runs instead.
    #[arg(long)]
    pub deployments: bool,
}

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "deployment")]
    id: String,
    #[tabled(rename = "ref")]
    ref_name: String,
    #[tabled(rename = "commit")]
    sha: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "run")]
    run: String,
}

impl RunsArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;

        if self.deployments {
            return list_deployments(&host, &manifest.repo, self.path.as_deref()).await;
        }

        let sha = match self.sha {
            Some(sha) => sha,
            None => {
                let state = attempt_store::load_at(&home()?, &manifest.repo)?;
                match state.commit_sha {
                    Some(sha) => sha,
                    None => bail!(
                        "no commit to correlate — pass --sha or provision '{}' first",
                        manifest.repo
                    ),
                }
            }
        };

        match correlate(&host, &manifest.repo, &sha, self.path.as_deref()).await? {
            None => {
                // Valid absence: the host may not have scheduled a run yet.
                println!("no run for commit {sha} yet — check again shortly");
            }
            Some(run_id) => {
                let run = host.runs().get(&manifest.repo, run_id).await?;
                let status = RunStatus::from_run(&run);
                print_run(&status, run.html_url.as_deref());
            }
        }
        Ok(())
    }
}

async fn list_deployments(
    host: &RepoHost,
    repo: &RepoSlug,
    path_hint: Option<&str>,
) -> Result<()> {
    let deployments = host.deployments().list(repo).await?;
    if deployments.is_empty() {
        println!("no deployments for '{repo}'");
        return Ok(());
    }

    let mut rows = Vec::new();
    for deployment in deployments.iter().take(10) {
        let correlated = correlate_deployment(host, repo, deployment, path_hint).await?;
        // Statuses come back newest first; the head entry is the current one.
        let state = host
            .deployments()
            .statuses(repo, correlated.id)
            .await?
            .first()
            .map(|status| status.state.clone())
            .unwrap_or_else(|| "—".to_string());
        rows.push(DeploymentRow {
            id: correlated.id.to_string(),
            ref_name: correlated.ref_name.clone(),
            sha: short_sha(&correlated.sha),
            state,
            run: correlated
                .run_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "—".to_string()),
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn print_run(status: &RunStatus, url: Option<&str>) {
    let derived = status.derived.to_string();
    let label = if status.derived.is_active() {
        derived.yellow()
    } else if status.derived.can_retry() {
        derived.red()
    } else {
        derived.green()
    };
    println!("run {} — {label}", status.run_id);
    if let Some(url) = url {
        println!("  {url}");
    }
    if status.derived.can_retry() {
        println!("  eligible for 'overture rerun {}'", status.run_id);
    }
    if status.derived.can_cancel() {
        println!("  eligible for 'overture cancel {}'", status.run_id);
    }
}

fn short_sha(sha: &str) -> String {
    sha.chars().take(8).collect()
}
