//! # Deed Node
//!
//! Operator entry point. Logs go to stderr, results to stdout as JSON.
//!
//! Exit codes: 0 on success, 2 when the registry rejects the operation,
//! 1 on any other failure.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use deed_node::cli::workflow_error_json;
use deed_node::{execute, Cli, NodeConfig};
use deed_telemetry::{init_logging, TelemetryConfig};
use dr_title_registry::WorkflowError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    let config = NodeConfig::new(cli.data_dir.clone()).with_telemetry(telemetry);

    if let Err(e) = init_logging(&config.telemetry) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match run(&config, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<WorkflowError>() {
            Some(rejected) => {
                println!("{}", workflow_error_json(rejected));
                ExitCode::from(2)
            }
            None => {
                eprintln!("Error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(config: &NodeConfig, cli: Cli) -> Result<()> {
    let output = execute(config, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
