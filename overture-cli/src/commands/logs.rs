//! `overture logs` — stream a run's log archive.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use futures::StreamExt;

use overture_core::RunId;
use overture_runs::LogStream;

use super::{build_host, load_manifest};

/// Arguments for `overture logs`.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Run whose logs to download.
    pub run_id: u64,

    /// Path to the provisioning manifest (defaults to ./overture.yaml).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Write the archive here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl LogsArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let host = build_host()?;

        // The host serves logs as one opaque archive; it is forwarded
        // verbatim, not extracted.
        let mut stream = LogStream::fetch(host, manifest.repo.clone(), RunId(self.run_id));

        let mut sink: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(
                std::fs::File::create(path)
                    .with_context(|| format!("failed to create '{}'", path.display()))?,
            ),
            None => Box::new(std::io::stdout().lock()),
        };

        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("log download failed")?;
            total += chunk.len();
            sink.write_all(&chunk).context("failed to write log chunk")?;
        }
        sink.flush().context("failed to flush log output")?;

        if let Some(path) = &self.output {
            eprintln!("wrote {total} bytes to {}", path.display());
        }
        Ok(())
    }
}
