//! stackprobe - integration test playbooks for deployed cloud stacks
//!
//! Runs ordered scenes (actions, polls and pauses) against the resources
//! of a deployed stack, resolving logical IDs to physical names and ARNs.

use clap::Parser;
use stackprobe::{cli, commands, common::logging};
use commands::Commands;

#[derive(Parser)]
#[command(name = "stackprobe", about = "Integration test playbooks for deployed stacks")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
