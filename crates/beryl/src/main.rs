use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout is reserved for the report contract.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("BERYL_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let app = cli::App::parse();
    match cli::run(app).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("beryl: {error:#}");
            ExitCode::FAILURE
        }
    }
}
