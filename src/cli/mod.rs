//! CLI command handling
//!
//! Loads configuration, runs the requested command and maps the outcome to
//! an error for `main` to turn into an exit code.

use std::path::Path;

use crate::commands::Commands;
use crate::common::config::{self, Config};
use crate::common::{Error, Result};
use crate::testing::TestRunner;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Run {
            base_url,
            strict,
            verbose,
        } => {
            let config = Config::load(config_path)?.with_base_url(base_url)?;
            let strict = strict || config.workflow.strict;

            let summary = TestRunner::new(config, verbose)?.run().await?;
            summary.print();

            if strict && !summary.is_clean() {
                return Err(Error::Unclean {
                    failed: summary.report.failures(),
                    warned: summary.report.warnings(),
                });
            }
            Ok(())
        }

        Commands::Health { base_url } => {
            let config = Config::load(config_path)?.with_base_url(base_url)?;
            let mut runner = TestRunner::new(config, false)?;
            runner.health_check().await
        }

        Commands::Config => {
            match config::effective_path(config_path) {
                Some(path) if path.exists() => println!("# Config file: {}", path.display()),
                Some(path) => println!("# Config file: {} (not found, using defaults)", path.display()),
                None => println!("# No config directory on this platform, using defaults"),
            }
            let config = Config::load(config_path)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
