use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::{with_retries, RetryPolicy};
use crate::config::Period;
use crate::pricing::{DailyQuote, MarketDataSource};
use crate::ui::progress::ProgressReporter;
use crate::utils::{decimal_from_f64, round_money};

/// Daily bar ready for export, prices rounded to four places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
    /// Midpoint of open and close; zero when either is missing
    pub mean: Decimal,
}

impl QuoteRecord {
    /// Build a record from a provider bar; missing fields become zero and
    /// are counted in `filled`. The mean is zero unless both open and close
    /// are present.
    pub fn from_daily_quote(ticker: &str, quote: &DailyQuote, filled: &mut usize) -> Self {
        let mut price = |value: Option<f64>| match value.and_then(decimal_from_f64) {
            Some(v) => v,
            None => {
                *filled += 1;
                Decimal::ZERO
            }
        };

        let open = price(quote.open);
        let high = price(quote.high);
        let low = price(quote.low);
        let close = price(quote.close);
        let volume = quote.volume.unwrap_or_else(|| {
            *filled += 1;
            0
        });

        let mean = match (
            quote.open.and_then(decimal_from_f64),
            quote.close.and_then(decimal_from_f64),
        ) {
            (Some(open), Some(close)) => (open + close) / Decimal::TWO,
            _ => Decimal::ZERO,
        };

        Self {
            ticker: ticker.to_string(),
            date: quote.date,
            open: round_money(open),
            high: round_money(high),
            low: round_money(low),
            close: round_money(close),
            volume,
            mean: round_money(mean),
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Counters reported at the end of the quote phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteSummary {
    pub processed: usize,
    pub with_quotes: usize,
    pub without_quotes: usize,
    /// Missing price or volume fields written as zero
    pub filled_fields: usize,
}

/// Everything the quote phase produced.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteCollection {
    pub period: Period,
    /// Rows per calendar year, each ordered by ticker then date
    pub by_year: BTreeMap<i32, Vec<QuoteRecord>>,
    pub summary: QuoteSummary,
    /// Tickers with at least one bar in the period, sorted
    pub tickers_with_quotes: Vec<String>,
}

impl QuoteCollection {
    pub fn total_rows(&self) -> usize {
        self.by_year.values().map(Vec::len).sum()
    }

    pub fn log_summary(&self) {
        info!("Quote collection summary:");
        info!("- Tickers processed: {}", self.summary.processed);
        info!("- Tickers with quotes: {}", self.summary.with_quotes);
        info!("- Tickers without quotes: {}", self.summary.without_quotes);
        info!("- Daily quote records: {}", self.total_rows());
    }
}

/// Collect the daily quotes of every ticker over `period`, split by year.
///
/// An empty history is not retried; a ticker whose fetch keeps failing is
/// logged and counted as without quotes.
pub async fn collect_quotes<S: MarketDataSource>(
    source: &S,
    tickers: &[String],
    period: Period,
    policy: &RetryPolicy,
    progress: &dyn ProgressReporter,
) -> QuoteCollection {
    info!(
        "Collecting daily quotes for {} tickers from {} to {}",
        tickers.len(),
        period.start_year,
        period.end_year
    );

    let total = tickers.len();
    let (from, to) = (period.first_day(), period.last_day());
    let mut summary = QuoteSummary::default();
    let mut by_year: BTreeMap<i32, Vec<QuoteRecord>> = BTreeMap::new();
    let mut tickers_with_quotes = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        summary.processed += 1;
        progress.advance(i + 1, total, ticker);

        let fetched = with_retries(policy, "quotes", ticker, move || {
            source.daily_quotes(ticker, from, to)
        })
        .await;

        let bars = match fetched {
            Ok(bars) => bars,
            Err(e) => {
                summary.without_quotes += 1;
                error!("{:#}", e);
                continue;
            }
        };

        sleep(policy.delay).await;

        let records: Vec<QuoteRecord> = bars
            .iter()
            .filter(|bar| period.contains(bar.date.year()))
            .map(|bar| QuoteRecord::from_daily_quote(ticker, bar, &mut summary.filled_fields))
            .collect();

        if records.is_empty() {
            warn!("{}: no quotes found for {}", ticker, period);
            summary.without_quotes += 1;
            continue;
        }

        info!("{}: {} quotes found", ticker, records.len());
        summary.with_quotes += 1;
        tickers_with_quotes.push(ticker.clone());
        for record in records {
            by_year.entry(record.year()).or_default().push(record);
        }
    }
    progress.finish();

    for rows in by_year.values_mut() {
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
    }
    tickers_with_quotes.sort();

    if summary.filled_fields > 0 {
        warn!(
            "{} missing price or volume fields were written as 0",
            summary.filled_fields
        );
    }

    QuoteCollection {
        period,
        by_year,
        summary,
        tickers_with_quotes,
    }
}
