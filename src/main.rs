//! Academy API check - end-to-end test client for the assignment management backend
//!
//! Signs up and approves a teacher, creates a course, then exercises create,
//! list, update and delete on assignments, reporting each step to the console.

use std::path::PathBuf;

use academy_check::common::logging;
use academy_check::{cli, commands::Commands};
use clap::Parser;

#[derive(Parser)]
#[command(name = "academy-check", about = "End-to-end check of the academy assignment API")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir, academy-check/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    logging::init_cli(command.verbose());

    if let Err(e) = cli::dispatch(command, cli.config.as_deref()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
