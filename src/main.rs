use anyhow::Context;
use clap::Parser;
use tracing::info;

use chainhub::adapter::inbound::cli::{self, output, Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    output::configure(output::OutputConfig::new(args.json, args.quiet));

    if let Err(e) = run(args).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = cli::load_config(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    config.init_logging();
    info!(command = ?args.command, "chainhub starting");

    cli::run(args, config).await?;
    Ok(())
}
