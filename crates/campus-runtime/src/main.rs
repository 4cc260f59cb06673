//! # Campus-Core Admin CLI
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load `CoreConfig` from `CC_*` variables, then apply argument overrides
//! 3. Install the tracing subscriber (stderr)
//! 4. Open the store and wire the services
//! 5. Run the command and print its JSON result on stdout

use anyhow::{Context, Result};
use campus_runtime::cli::Cli;
use campus_runtime::commands::execute;
use campus_runtime::logging::init_logging;
use campus_runtime::{CoreConfig, CoreContainer};
use clap::Parser;
use tracing::error;

fn main() {
    if let Err(e) = run() {
        error!(error = %e, "command failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env().context("failed to load configuration")?;
    if let Some(path) = cli.data_file.clone() {
        config = config.with_data_file(path);
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    init_logging(&config.logging)?;

    let container = CoreContainer::open(config)?;
    let output = execute(&container, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
