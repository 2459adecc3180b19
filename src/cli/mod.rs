use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CollectorConfig;

pub mod formatters;

#[derive(Parser)]
#[command(name = "b3-dividends")]
#[command(
    version,
    about = "Collect dividend and daily quote history for B3 stocks into CSV files"
)]
#[command(
    long_about = "Fetch the dividend and daily price history of Brazilian (B3) stocks from Yahoo Finance, rank the largest payers per year and write everything to semicolon separated CSV files."
)]
pub struct Cli {
    /// Configuration file (TOML); defaults to the per-user config when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Log debug details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect dividends, write dividends.csv and dividends_year.csv, show statistics
    Dividends(RunArgs),

    /// Collect daily quotes and write one CSV per year
    Quotes(RunArgs),

    /// Collect dividends, then daily quotes
    All(RunArgs),

    /// Print the ticker universe a run would use
    Tickers(TickerArgs),
}

/// Where the ticker list comes from, overriding the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct TickerArgs {
    /// File with tickers separated by commas, spaces or newlines
    #[arg(long)]
    pub tickers_file: Option<PathBuf>,

    /// Comma separated tickers (e.g. PETR4,VALE3)
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,
}

/// Options shared by the collection commands.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// First year of the period (inclusive)
    #[arg(long = "from")]
    pub start_year: Option<i32>,

    /// Last year of the period (inclusive)
    #[arg(long = "to")]
    pub end_year: Option<i32>,

    /// Directory receiving the CSV files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub tickers: TickerArgs,

    /// Attempts per ticker before giving up on it
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Pause after each request in milliseconds (retries wait twice as long)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Show a progress bar instead of periodic progress log lines
    #[arg(long)]
    pub progress: bool,
}

impl TickerArgs {
    pub fn apply(&self, config: &mut CollectorConfig) {
        if let Some(tickers) = &self.tickers {
            config.tickers = Some(tickers.clone());
            config.tickers_file = None;
        }
        if let Some(path) = &self.tickers_file {
            config.tickers_file = Some(path.clone());
            config.tickers = None;
        }
    }
}

impl RunArgs {
    /// Override config values with the flags given on the command line.
    pub fn apply(&self, config: &mut CollectorConfig) {
        if let Some(year) = self.start_year {
            config.start_year = year;
        }
        if let Some(year) = self.end_year {
            config.end_year = year;
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = delay;
        }
        self.tickers.apply(config);
    }
}

impl Commands {
    /// Apply the command's flags on top of the loaded configuration.
    pub fn apply(&self, config: &mut CollectorConfig) {
        match self {
            Commands::Dividends(args) | Commands::Quotes(args) | Commands::All(args) => {
                args.apply(config)
            }
            Commands::Tickers(args) => args.apply(config),
        }
    }
}
