//! clipshare - send and receive files through a clipshare server.
//!
//! Set CLIPSHARE_API_URL (default http://localhost:4000). CLIPSHARE_SWEEP_TOKEN
//! is sent with `sweep` when set.

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipshare_cli::{init_tracing, output_path, ShareClient};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipshare", about = "Share files under a short code")]
struct Cli {
    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more files and print the share code
    Send {
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Download every file shared under a code
    Receive {
        /// Share code (case-sensitive)
        code: String,
        /// Directory to write files into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Trigger one expiration sweep on the server
    Sweep,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ShareClient::from_env()?;
    tracing::debug!(base_url = %client.base_url(), "Using clipshare server");

    match cli.command {
        Commands::Send { files } => {
            let response = client.send(&files).await?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("Code: {}", response.code);
                if let Some(url) = &response.share_url {
                    println!("Link: {}", url);
                }
                println!("Expires: {}", response.expires_at.to_rfc3339());
            }
        }
        Commands::Receive { code, out } => {
            let manifest = client.manifest(&code).await?;
            tokio::fs::create_dir_all(&out)
                .await
                .with_context(|| format!("Failed to create {}", out.display()))?;

            for file in &manifest.files {
                let target = output_path(&out, &file.name)
                    .with_context(|| format!("Refusing to write file named {:?}", file.name))?;
                let data = client.download(&file.url).await?;
                tokio::fs::write(&target, &data)
                    .await
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                if !cli.json {
                    println!("{} ({} bytes)", target.display(), data.len());
                }
            }

            if cli.json {
                print_json(&manifest)?;
            }
        }
        Commands::Sweep => {
            let report = client.sweep().await?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "Swept {} uploads: {} records and {} files deleted, {} orphan files removed",
                    report.records_processed,
                    report.records_deleted,
                    report.blobs_deleted,
                    report.orphan_blobs_deleted
                );
            }
            if report.has_failures() {
                anyhow::bail!(
                    "Sweep finished with failures: {} files, {} records, {} orphan files",
                    report.blobs_failed,
                    report.records_failed,
                    report.orphan_blobs_failed
                );
            }
        }
    }

    Ok(())
}
