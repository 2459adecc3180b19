use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::cli::formatters::{format_dividend_summary, format_json, format_statistics_table};
use crate::collector::{collect_dividends, DividendSummary};
use crate::config::{CollectorConfig, Period};
use crate::error::Result;
use crate::export::{
    write_annual_csv, write_dividends_csv, write_ticker_list, ANNUAL_DIVIDENDS_FILENAME,
    DIVIDENDS_FILENAME, PAYING_TICKERS_FILENAME,
};
use crate::pricing::MarketDataSource;
use crate::reports::DividendStatistics;
use crate::ui::progress::ProgressReporter;

/// What the dividend phase did, as printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct DividendReport {
    pub period: Period,
    pub summary: DividendSummary,
    pub records: usize,
    pub files: Vec<PathBuf>,
    pub statistics: Option<DividendStatistics>,
}

/// Collect dividends, write the dividend CSVs and compute the statistics.
///
/// An empty collection is not an error: it is logged and nothing is written.
pub async fn run_dividend_phase<S: MarketDataSource>(
    source: &S,
    tickers: &[String],
    config: &CollectorConfig,
    progress: &dyn ProgressReporter,
) -> Result<DividendReport> {
    let period = config.period();
    let collection =
        collect_dividends(source, tickers, period, &config.retry_policy(), progress).await;
    collection.log_summary();

    let mut report = DividendReport {
        period,
        summary: collection.summary.clone(),
        records: collection.records.len(),
        files: Vec::new(),
        statistics: None,
    };

    if collection.is_empty() {
        error!("No dividend data was collected; no CSV written");
        return Ok(report);
    }

    let dividends_path = config.output_dir.join(DIVIDENDS_FILENAME);
    let count = write_dividends_csv(&dividends_path, &collection.records)?;
    info!("Saved {} with {} records", dividends_path.display(), count);
    report.files.push(dividends_path);

    let annual_path = config.output_dir.join(ANNUAL_DIVIDENDS_FILENAME);
    let count = write_annual_csv(&annual_path, &collection.annual)?;
    info!("Saved {} with {} records", annual_path.display(), count);
    report.files.push(annual_path);

    let list_path = config.output_dir.join(PAYING_TICKERS_FILENAME);
    if write_ticker_list(
        &list_path,
        "Tickers that paid dividends in",
        period,
        &collection.paying_tickers,
    )? {
        info!(
            "Saved {} tickers with dividends to {}",
            collection.paying_tickers.len(),
            list_path.display()
        );
        report.files.push(list_path);
    }

    report.statistics =
        DividendStatistics::compute(&collection, config.top_n, config.consistent_n);
    if report.statistics.is_none() {
        warn!("No data available for statistics");
    }

    Ok(report)
}

pub fn print_report(report: &DividendReport, json_output: bool) {
    if json_output {
        println!("{}", format_json(report));
        return;
    }

    if let Some(stats) = &report.statistics {
        println!("{}", format_statistics_table(stats));
    }
    println!("{}", format_dividend_summary(&report.summary, report.records));
    for file in &report.files {
        println!("  {}", file.display());
    }
}
