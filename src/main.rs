//! BMC runner - readiness polling and test suite orchestration
//!
//! Waits for a Redfish BMC to come up, runs the connectivity, pytest,
//! web UI, load and security suites, and writes a JSON report.

use std::path::PathBuf;

use bmc_runner::{cli, commands};
use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "bmc-runner", about = "Redfish BMC test suite orchestrator")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level progress output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli::dispatch(cli.command, cli.config.as_deref(), cli.verbose).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
