//! Runway CLI - drive plan and apply runs on a remote execution service

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use runway_cli::cli::Cli;
use runway_cli::domain::ConfigError;
use runway_cli::output::json;

/// Filter for diagnostic logs, e.g. `RUNWAY_LOG=runway_cli=debug`.
const LOG_ENV: &str = "RUNWAY_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let as_json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            let code = if e.downcast_ref::<ConfigError>().is_some() {
                "config"
            } else {
                "error"
            };
            match json::format_error(&message, code) {
                Ok(body) if as_json => println!("{body}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}
