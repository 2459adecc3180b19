//! CSV and text output
//!
//! Every CSV uses `;` as separator, a decimal comma and four decimal places,
//! which is what spreadsheet software configured for pt-BR expects.

use anyhow::Context;
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::collector::{AnnualDividend, DividendRecord, QuoteCollection, QuoteRecord};
use crate::config::Period;
use crate::error::Result;
use crate::utils::{format_date, format_decimal_comma, MONEY_DP};

pub const DIVIDENDS_FILENAME: &str = "dividends.csv";
pub const ANNUAL_DIVIDENDS_FILENAME: &str = "dividends_year.csv";
pub const QUOTES_DIRNAME: &str = "quotes";
pub const PAYING_TICKERS_FILENAME: &str = "tickers_with_dividends.txt";
pub const QUOTED_TICKERS_FILENAME: &str = "tickers_with_quotes.txt";

#[derive(Debug, Serialize)]
struct DividendRow {
    date: String,
    ticker: String,
    value: String,
    year: i32,
}

#[derive(Debug, Serialize)]
struct AnnualDividendRow {
    year: i32,
    ticker: String,
    value: String,
    rank: u32,
}

#[derive(Debug, Serialize)]
struct QuoteRow {
    date: String,
    ticker: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: u64,
    mean: String,
}

impl From<&DividendRecord> for DividendRow {
    fn from(record: &DividendRecord) -> Self {
        Self {
            date: format_date(record.date),
            ticker: record.ticker.clone(),
            value: format_decimal_comma(record.value, MONEY_DP),
            year: record.year(),
        }
    }
}

impl From<&AnnualDividend> for AnnualDividendRow {
    fn from(row: &AnnualDividend) -> Self {
        Self {
            year: row.year,
            ticker: row.ticker.clone(),
            value: format_decimal_comma(row.total, MONEY_DP),
            rank: row.rank,
        }
    }
}

impl From<&QuoteRecord> for QuoteRow {
    fn from(record: &QuoteRecord) -> Self {
        Self {
            date: format_date(record.date),
            ticker: record.ticker.clone(),
            open: format_decimal_comma(record.open, MONEY_DP),
            high: format_decimal_comma(record.high, MONEY_DP),
            low: format_decimal_comma(record.low, MONEY_DP),
            close: format_decimal_comma(record.close, MONEY_DP),
            volume: record.volume,
            mean: format_decimal_comma(record.mean, MONEY_DP),
        }
    }
}

/// Write serializable rows as a `;` separated CSV with a header row.
fn write_rows<R: Serialize>(path: &Path, rows: impl IntoIterator<Item = R>) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    let mut count = 0;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
        count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file {}", path.display()))?;
    Ok(count)
}

/// Write `dividends.csv`: `date;ticker;value;year`.
pub fn write_dividends_csv(path: &Path, records: &[DividendRecord]) -> Result<usize> {
    write_rows(path, records.iter().map(DividendRow::from))
}

/// Write `dividends_year.csv`: `year;ticker;value;rank`.
pub fn write_annual_csv(path: &Path, annual: &[AnnualDividend]) -> Result<usize> {
    write_rows(path, annual.iter().map(AnnualDividendRow::from))
}

/// Write one quote file: `date;ticker;open;high;low;close;volume;mean`.
pub fn write_quotes_csv(path: &Path, records: &[QuoteRecord]) -> Result<usize> {
    write_rows(path, records.iter().map(QuoteRow::from))
}

/// Path of the quote file for `year` under `output_dir`.
pub fn quotes_path(output_dir: &Path, year: i32) -> PathBuf {
    output_dir
        .join(QUOTES_DIRNAME)
        .join(format!("quotes_{}.csv", year))
}

/// Write one quote file per year of the period; years without rows are
/// skipped with a warning. Returns the files written.
pub fn write_quotes_by_year(output_dir: &Path, collection: &QuoteCollection) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for year in collection.period.years() {
        let rows = match collection.by_year.get(&year) {
            Some(rows) if !rows.is_empty() => rows,
            _ => {
                warn!("No quotes found for year {}", year);
                continue;
            }
        };

        let path = quotes_path(output_dir, year);
        let count = write_quotes_csv(&path, rows)?;
        let tickers = distinct_tickers(rows);
        info!(
            "Saved {} with {} quotes from {} tickers",
            path.display(),
            count,
            tickers
        );
        written.push(path);
    }

    Ok(written)
}

fn distinct_tickers(rows: &[QuoteRecord]) -> usize {
    rows.iter().map(|r| r.ticker.as_str()).unique().count()
}

/// Write a reference list of tickers under a header naming the period.
/// Nothing is written for an empty list.
pub fn write_ticker_list(
    path: &Path,
    title: &str,
    period: Period,
    tickers: &[String],
) -> Result<bool> {
    if tickers.is_empty() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut sorted = tickers.to_vec();
    sorted.sort();
    let content = format!("{} {}:\n{}\n", title, period, sorted.join("\n"));
    fs::write(path, content)
        .with_context(|| format!("Failed to write ticker list {}", path.display()))?;
    Ok(true)
}
