// Pricing module - market data provider seam and Yahoo Finance client

pub mod yahoo;

use chrono::NaiveDate;

use crate::error::Result;

pub use yahoo::YahooClient;

/// Cash dividend as reported by the provider (per share, raw float).
#[derive(Debug, Clone, PartialEq)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Daily OHLCV bar as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Source of dividend and price history for B3 tickers.
///
/// Tickers are passed without the `.SA` suffix. Implementations return an
/// empty vec when the ticker exists but has no data in the range, and an
/// error when the request itself failed.
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    /// Cash dividends with a date between `from` and `to` (inclusive).
    async fn dividends(&self, ticker: &str, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<DividendEvent>>;

    /// Daily bars between `from` and `to` (inclusive).
    async fn daily_quotes(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>>;
}
