//! Command dispatcher that routes the parsed clap commands to the
//! collection phases.
//!
//! Each phase is generic over [`MarketDataSource`] so it can run against
//! Yahoo in production and an in-memory source in tests.

mod dividends;
mod quotes;
mod tickers;

pub use dividends::{run_dividend_phase, DividendReport};
pub use quotes::{run_quote_phase, QuoteReport};
pub use tickers::resolve_tickers;

use serde::Serialize;
use tracing::{error, info};

use crate::cli::formatters::format_json;
use crate::cli::Commands;
use crate::config::CollectorConfig;
use crate::error::Result;
use crate::pricing::{MarketDataSource, YahooClient};
use crate::ui::progress::{BarProgress, LogProgress, NoProgress, ProgressReporter};

/// Progress lines are logged every this many tickers.
const DIVIDEND_PROGRESS_EVERY: usize = 10;
const QUOTE_PROGRESS_EVERY: usize = 5;

/// Outcome of the `all` command.
#[derive(Debug, Serialize)]
pub struct CombinedReport {
    /// `None` when the dividend phase failed
    pub dividends: Option<DividendReport>,
    pub quotes: QuoteReport,
}

/// Route a parsed command to its handler
pub async fn dispatch_command(
    command: &Commands,
    config: &CollectorConfig,
    json_output: bool,
) -> Result<()> {
    config.validate()?;

    match command {
        Commands::Tickers(_) => tickers::dispatch_tickers(config, json_output),
        Commands::Dividends(args) => {
            let tickers = resolve_tickers(config)?;
            let source = YahooClient::new()?;
            let progress = progress_for(
                "Dividends",
                DIVIDEND_PROGRESS_EVERY,
                args.progress,
                json_output,
                tickers.len(),
            );
            let report = run_dividend_phase(&source, &tickers, config, progress.as_ref()).await?;
            dividends::print_report(&report, json_output);
            Ok(())
        }
        Commands::Quotes(args) => {
            let tickers = resolve_tickers(config)?;
            let source = YahooClient::new()?;
            let progress = progress_for(
                "Quotes",
                QUOTE_PROGRESS_EVERY,
                args.progress,
                json_output,
                tickers.len(),
            );
            let report = run_quote_phase(&source, &tickers, config, progress.as_ref()).await?;
            quotes::print_report(&report, json_output);
            Ok(())
        }
        Commands::All(args) => {
            let tickers = resolve_tickers(config)?;
            let source = YahooClient::new()?;
            let dividend_progress = progress_for(
                "Dividends",
                DIVIDEND_PROGRESS_EVERY,
                args.progress,
                json_output,
                tickers.len(),
            );
            let quote_progress = progress_for(
                "Quotes",
                QUOTE_PROGRESS_EVERY,
                args.progress,
                json_output,
                tickers.len(),
            );

            let report = run_all(
                &source,
                &tickers,
                config,
                dividend_progress.as_ref(),
                quote_progress.as_ref(),
            )
            .await?;

            if json_output {
                println!("{}", format_json(&report));
            } else {
                if let Some(dividend_report) = &report.dividends {
                    dividends::print_report(dividend_report, false);
                }
                quotes::print_report(&report.quotes, false);
            }
            Ok(())
        }
    }
}

/// Run the dividend phase, then the quote phase. A failed dividend phase is
/// logged and leaves `dividends` empty; the quote phase runs regardless.
pub async fn run_all<S: MarketDataSource>(
    source: &S,
    tickers: &[String],
    config: &CollectorConfig,
    dividend_progress: &dyn ProgressReporter,
    quote_progress: &dyn ProgressReporter,
) -> Result<CombinedReport> {
    let dividends = match run_dividend_phase(source, tickers, config, dividend_progress).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Dividend collection failed: {:#}", e);
            None
        }
    };

    info!("Starting daily quote collection");
    let quotes = run_quote_phase(source, tickers, config, quote_progress).await?;

    Ok(CombinedReport { dividends, quotes })
}

/// Pick the progress reporter for a phase. The bar is only drawn when asked
/// for and stdout is not reserved for JSON.
fn progress_for(
    label: &'static str,
    every: usize,
    bar: bool,
    json_output: bool,
    total: usize,
) -> Box<dyn ProgressReporter> {
    match (bar, json_output) {
        (true, false) => Box::new(BarProgress::new(label, total)),
        (true, true) => Box::new(NoProgress),
        _ => Box::new(LogProgress::new(label, every)),
    }
}
