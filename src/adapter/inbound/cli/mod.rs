//! Command-line interface for the `chainhub` binary.

pub mod chains;
pub mod command;
pub mod fee;
pub mod output;
pub mod query;
pub mod serve;

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

pub use command::{Cli, Commands};

/// Load the configuration file, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or is invalid.
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

/// Dispatch a parsed command.
///
/// # Errors
///
/// Returns the first error of the command; output has already been printed
/// for anything that succeeded.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve => serve::execute(&config).await,
        Commands::Chains(args) => chains::execute(&config, &args),
        Commands::Token(args) => query::token(&config, &args).await,
        Commands::Balance(args) => query::balance(&config, &args).await,
        Commands::Fee(args) => fee::execute(&config, &args),
    }
}
