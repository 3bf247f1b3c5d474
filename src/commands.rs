//! CLI command definitions
//!
//! Defines the clap commands for the academy API check.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full teacher/course/assignment workflow (the default)
    Run {
        /// Backend base URL including the /api prefix
        #[arg(long)]
        base_url: Option<String>,

        /// Exit non-zero when any step fails or warns
        #[arg(long)]
        strict: bool,

        /// Print response details and debug logs
        #[arg(long, short)]
        verbose: bool,
    },

    /// Only check that the API answers GET /test
    Health {
        /// Backend base URL including the /api prefix
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show the config file location and the effective configuration
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            base_url: None,
            strict: false,
            verbose: false,
        }
    }
}

impl Commands {
    pub fn verbose(&self) -> bool {
        matches!(self, Commands::Run { verbose: true, .. })
    }
}
