use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::formatters::{format_json, format_quote_summary};
use crate::collector::{collect_quotes, QuoteSummary};
use crate::config::{CollectorConfig, Period};
use crate::error::Result;
use crate::export::{write_quotes_by_year, write_ticker_list, QUOTED_TICKERS_FILENAME};
use crate::pricing::MarketDataSource;
use crate::ui::progress::ProgressReporter;

/// What the quote phase did, as printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct QuoteReport {
    pub period: Period,
    pub summary: QuoteSummary,
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

/// Collect daily quotes and write one CSV per year plus the list of tickers
/// with quotes.
pub async fn run_quote_phase<S: MarketDataSource>(
    source: &S,
    tickers: &[String],
    config: &CollectorConfig,
    progress: &dyn ProgressReporter,
) -> Result<QuoteReport> {
    let period = config.period();
    let collection =
        collect_quotes(source, tickers, period, &config.retry_policy(), progress).await;
    collection.log_summary();

    if collection.by_year.is_empty() {
        warn!("No daily quotes were collected for {}", period);
    }
    let mut files = write_quotes_by_year(&config.output_dir, &collection)?;

    let list_path = config.output_dir.join(QUOTED_TICKERS_FILENAME);
    if write_ticker_list(
        &list_path,
        "Tickers with quotes in",
        period,
        &collection.tickers_with_quotes,
    )? {
        info!(
            "Saved {} tickers with quotes to {}",
            collection.tickers_with_quotes.len(),
            list_path.display()
        );
        files.push(list_path);
    }

    Ok(QuoteReport {
        period,
        summary: collection.summary.clone(),
        rows: collection.total_rows(),
        files,
    })
}

pub fn print_report(report: &QuoteReport, json_output: bool) {
    if json_output {
        println!("{}", format_json(report));
        return;
    }

    println!("{}", format_quote_summary(&report.summary, report.rows));
    for file in &report.files {
        println!("  {}", file.display());
    }
}
