//! scctl - drive a backend sidecar from the terminal
//!
//! # Examples
//!
//! ```bash
//! # Start the sidecar, stream its logs, Ctrl-C to stop
//! scctl run
//!
//! # Start, wait for the backend, call an endpoint, then stop
//! scctl run --request /api/status --exit-after-requests
//!
//! # Query an already-running backend
//! scctl probe --pretty
//! scctl request -X POST /api/items --body '{"name":"x"}'
//! ```

mod cli;
mod commands;
mod error;
mod runner;

#[cfg(test)]
mod tests;

use crate::{
    cli::Cli,
    commands::Commands,
    runner::RunOptions,
};

use sc_host::AppConfig;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match AppConfig::load_or_create(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", e.recovery_hint());
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Run {
            via_bridge,
            requests,
            exit_after_requests,
        } => runner::run(
            &config,
            RunOptions {
                via_bridge,
                requests,
                exit_after_requests,
                pretty: cli.pretty,
            },
        )
        .await
        .map(|()| None),
        Commands::Probe => runner::probe(&config, cli.pretty).await.map(Some),
        Commands::Request {
            method,
            endpoint,
            body,
        } => runner::request(&config, method, &endpoint, body.as_deref(), cli.pretty)
            .await
            .map(Some),
    };

    match result {
        Ok(output) => {
            if let Some(output) = output {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", e.recovery_hint());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
