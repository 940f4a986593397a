//! Command-line interface definitions.
//!
//! Defines the CLI structure for the chainhub binary using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-chain reference data and unified chain queries
#[derive(Parser, Debug)]
#[command(name = "chainhub")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load all reference data and keep it fresh until Ctrl-C
    Serve,

    /// List configured chains
    Chains(ChainsArgs),

    /// Show token metadata
    Token(TokenArgs),

    /// Query an on-chain balance
    Balance(BalanceArgs),

    /// Resolve the bridge fee for an amount
    Fee(FeeArgs),
}

#[derive(Args, Debug)]
pub struct ChainsArgs {
    /// Include disabled chains
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Chain name, case-insensitive
    pub chain: String,

    /// Token address
    pub address: String,

    /// Skip the reference table and ask the chain
    #[arg(long)]
    pub onchain: bool,
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Chain name, case-insensitive
    pub chain: String,

    /// Owner address
    pub owner: String,

    /// Token address; the zero address is the native coin
    #[arg(default_value = "0x0")]
    pub token: String,
}

#[derive(Args, Debug)]
pub struct FeeArgs {
    /// Token symbol
    pub token: String,

    /// Source chain name
    pub from: String,

    /// Destination chain name
    pub to: String,

    /// Transfer amount in display units, e.g. `250.5`
    pub amount: String,

    /// Token decimals; also resolves the fee in base units
    #[arg(long)]
    pub decimals: Option<i32>,
}
