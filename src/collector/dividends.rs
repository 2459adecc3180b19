use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::{with_retries, RetryPolicy};
use crate::config::Period;
use crate::pricing::{DividendEvent, MarketDataSource};
use crate::ui::progress::ProgressReporter;
use crate::utils::{decimal_from_f64, format_date, round_money};

/// One cash dividend kept for the report, value rounded to four places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividendRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub value: Decimal,
}

impl DividendRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Total paid by a ticker in one year, with its dense rank inside that year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualDividend {
    pub year: i32,
    pub ticker: String,
    pub total: Decimal,
    /// 1 = largest payer of the year; equal totals share a rank
    pub rank: u32,
}

/// Counters reported at the end of the dividend phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DividendSummary {
    pub processed: usize,
    pub with_dividends: usize,
    pub failed: usize,
    pub invalid_values: usize,
}

/// Everything the dividend phase produced.
#[derive(Debug, Clone, Serialize)]
pub struct DividendCollection {
    pub period: Period,
    /// Ordered by ticker, then date
    pub records: Vec<DividendRecord>,
    /// Ordered by year, rank, then ticker
    pub annual: Vec<AnnualDividend>,
    pub summary: DividendSummary,
    /// Tickers with at least one dividend in the period, sorted
    pub paying_tickers: Vec<String>,
}

impl DividendCollection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn log_summary(&self) {
        info!("Dividend collection summary:");
        info!("- Period: {} to {}", self.period.start_year, self.period.end_year);
        info!("- Tickers processed: {}", self.summary.processed);
        info!("- Tickers with dividends: {}", self.summary.with_dividends);
        info!("- Tickers with errors: {}", self.summary.failed);
        info!("- Invalid values skipped: {}", self.summary.invalid_values);
        info!("- Detailed dividend records: {}", self.records.len());
        info!("- Annual dividend records: {}", self.annual.len());
    }
}

/// Collect the dividends of every ticker over `period`.
///
/// Tickers whose fetch keeps failing are logged, counted in
/// `summary.failed` and skipped.
pub async fn collect_dividends<S: MarketDataSource>(
    source: &S,
    tickers: &[String],
    period: Period,
    policy: &RetryPolicy,
    progress: &dyn ProgressReporter,
) -> DividendCollection {
    info!(
        "Collecting dividends for {} tickers from {} to {}",
        tickers.len(),
        period.start_year,
        period.end_year
    );

    let total = tickers.len();
    let (from, to) = (period.first_day(), period.last_day());
    let mut summary = DividendSummary::default();
    let mut records = Vec::new();
    let mut paying_tickers = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        summary.processed += 1;
        progress.advance(i + 1, total, ticker);

        let fetched = with_retries(policy, "dividends", ticker, move || {
            source.dividends(ticker, from, to)
        })
        .await;

        let events = match fetched {
            Ok(events) => events,
            Err(e) => {
                summary.failed += 1;
                error!("{:#}", e);
                continue;
            }
        };

        // Pace requests to the provider
        sleep(policy.delay).await;

        let kept = keep_valid_dividends(ticker, &events, period, &mut summary.invalid_values);
        if !kept.is_empty() {
            summary.with_dividends += 1;
            paying_tickers.push(ticker.clone());
            info!("{}: {} dividends found", ticker, kept.len());
        }
        records.extend(kept);
    }
    progress.finish();

    records.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
    paying_tickers.sort();
    let annual = aggregate_annual(&records);

    if records.is_empty() {
        warn!(
            "No dividends found between {} and {}",
            period.start_year, period.end_year
        );
    }

    DividendCollection {
        period,
        records,
        annual,
        summary,
        paying_tickers,
    }
}

/// Keep the events inside `period` with a positive finite amount, rounded.
fn keep_valid_dividends(
    ticker: &str,
    events: &[DividendEvent],
    period: Period,
    invalid: &mut usize,
) -> Vec<DividendRecord> {
    events
        .iter()
        .filter(|event| period.contains(event.date.year()))
        .filter_map(|event| match decimal_from_f64(event.amount) {
            Some(value) if value > Decimal::ZERO => Some(DividendRecord {
                ticker: ticker.to_string(),
                date: event.date,
                value: round_money(value),
            }),
            _ => {
                *invalid += 1;
                warn!(
                    "Invalid value for {} on {}: {}",
                    ticker,
                    format_date(event.date),
                    event.amount
                );
                None
            }
        })
        .collect()
}

/// Sum the records per (ticker, year) and dense-rank each year by total.
pub fn aggregate_annual(records: &[DividendRecord]) -> Vec<AnnualDividend> {
    let mut totals: BTreeMap<i32, BTreeMap<&str, Decimal>> = BTreeMap::new();
    for record in records {
        *totals
            .entry(record.year())
            .or_default()
            .entry(record.ticker.as_str())
            .or_default() += record.value;
    }

    let mut annual = Vec::new();
    for (year, by_ticker) in totals {
        let mut year_rows: Vec<(&str, Decimal)> = by_ticker
            .into_iter()
            .map(|(ticker, total)| (ticker, round_money(total)))
            .collect();
        // Largest first; BTreeMap order keeps tickers alphabetical within ties
        year_rows.sort_by(|a, b| b.1.cmp(&a.1));

        let mut rank = 0;
        let mut previous: Option<Decimal> = None;
        for (ticker, total) in year_rows {
            if previous != Some(total) {
                rank += 1;
                previous = Some(total);
            }
            annual.push(AnnualDividend {
                year,
                ticker: ticker.to_string(),
                total,
                rank,
            });
        }
    }

    annual
}
