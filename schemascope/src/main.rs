//! PostgreSQL schema structure report.
//!
//! Connects to one database, reports on the target tables of one schema and
//! prints the product and order name listings when those tables exist.
//!
//! # Security Guarantees
//! - Read-only session
//! - Passwords are never logged or printed
//! - The connection is always released before exit

use clap::Parser;
use schemascope::Cli;
use schemascope::runner::RunController;
use schemascope_core::{PostgresCatalog, init_logging};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Inspecting schema '{}' on {}",
        config.schema, config.connection
    );

    let mut controller = RunController::new(&config);
    let outcome = controller
        .run(
            || PostgresCatalog::connect(&config.connection, &config.credentials),
            &mut io::stdout(),
            &mut io::stderr(),
        )
        .await;

    info!("Run finished in state {}", controller.state());
    outcome.exit_code()
}
