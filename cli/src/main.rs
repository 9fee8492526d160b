//! vmlc - Compute Engine VM lifecycle from the command line

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vmlc::cli::Cli;
use vmlc::domain::Interrupted;
use vmlc::infra::interrupt::EXIT_INTERRUPTED;
use vmlc::output::error_line;
use vmlc::output::json::format_error;

/// Environment variable holding the log filter, e.g. `vmlc=debug`.
const LOG_ENV: &str = "VMLC_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) if e.downcast_ref::<Interrupted>().is_some() => {
            eprintln!("{e}");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            match format_error(&format!("{e:#}"), "ERROR") {
                Ok(body) if json => println!("{body}"),
                _ => eprintln!("{}", error_line(&e)),
            }
            ExitCode::FAILURE
        }
    }
}
