//! Command-line surface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use url::Url;

use beryl_fetch::{ConsoleSink, IndexFetcher, ReqwestClient, SourceIndex};

use crate::config;

#[derive(Parser)]
#[command(name = "beryl", about = "Fetch and install gems from declared sources", version)]
pub struct App {
    /// Path to the configuration file (default: ~/.config/beryl/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Global mirror URI; overrides the config file's `all` entry.
    #[arg(long, global = true)]
    pub mirror: Option<Url>,

    /// Global fallback timeout: "true", "false" or seconds.
    #[arg(long, global = true)]
    pub fallback_timeout: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the spec index for a source and summarize it.
    Fetch {
        /// Source index URI.
        source: Url,
    },
    /// Fetch the index, then install the named gems.
    Install {
        /// Source index URI.
        source: Url,
        /// Gems to install.
        #[arg(required = true)]
        gems: Vec<String>,
    },
}

pub async fn run(app: App) -> anyhow::Result<ExitCode> {
    let mirrors = config::load(&app)?;
    let client = ReqwestClient::new().context("failed to build HTTP client")?;
    let fetcher = IndexFetcher::new(client, mirrors, Arc::new(ConsoleSink));

    // On failure the terminal-error line has already been emitted by the
    // fetcher; only the exit status is left to us.
    match app.command {
        Command::Fetch { source } => match fetcher.fetch(&source).await {
            Ok(index) => {
                println!("{} specs available from {source}", index.len());
                Ok(ExitCode::SUCCESS)
            }
            Err(_) => Ok(ExitCode::FAILURE),
        },
        Command::Install { source, gems } => match fetcher.fetch(&source).await {
            Ok(index) => Ok(install(&index, &gems)),
            Err(_) => Ok(ExitCode::FAILURE),
        },
    }
}

/// Installer boundary: consumes a fetched index and reports what is being
/// installed. Dependency resolution and placement live elsewhere.
fn install(index: &SourceIndex, gems: &[String]) -> ExitCode {
    let mut missing = false;
    for name in gems {
        match index.get(name) {
            Some(spec) => println!("Installing {} {}", spec.name, spec.version),
            None => {
                eprintln!("Could not find gem '{name}' in any of the sources");
                missing = true;
            }
        }
    }
    if missing {
        return ExitCode::FAILURE;
    }
    println!("Bundle complete! {} gems installed.", gems.len());
    ExitCode::SUCCESS
}
