use anyhow::Result;
use b3_dividends::cli::Cli;
use b3_dividends::config::CollectorConfig;
use b3_dividends::dispatcher::dispatch_command;
use b3_dividends::logging::init_logging;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = CollectorConfig::load(cli.config.as_deref())?;
    cli.command.apply(&mut config);

    init_logging(cli.verbose, !cli.no_color, config.log_path())?;
    info!(
        "Starting b3-dividends {} (output: {})",
        env!("CARGO_PKG_VERSION"),
        config.output_dir.display()
    );

    if let Err(e) = dispatch_command(&cli.command, &config, cli.json).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
