use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::{DailyQuote, DividendEvent, MarketDataSource};
use crate::error::{CollectorError, Result};
use crate::tickers::yahoo_symbol;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; B3DividendsBot/1.0)";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<Meta>,
    timestamp: Option<Vec<i64>>,
    events: Option<Events>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    /// Exchange offset from UTC in seconds (-10800 for B3)
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Events {
    dividends: Option<HashMap<String, DividendEntry>>,
}

#[derive(Debug, Deserialize)]
struct DividendEntry {
    amount: Option<f64>,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Yahoo Finance v8 chart API client
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against another host, e.g. `https://query2.finance.yahoo.com`
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate, dividends: bool) -> String {
        let (period1, period2) = unix_range(from, to);
        let mut url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        );
        if dividends {
            url.push_str("&events=div");
        }
        url
    }

    /// Fetch the raw chart JSON for a ticker
    async fn fetch_chart(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
        dividends: bool,
    ) -> Result<String> {
        let symbol = yahoo_symbol(ticker);
        let url = self.chart_url(&symbol, from, to, dividends);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Yahoo Finance response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<YahooChartResponse>(&body)
                .ok()
                .and_then(|data| data.chart.error)
                .map(|error| format!("{} - {}", error.code, error.description))
                .unwrap_or_else(|| "no error details".to_string());
            return Err(CollectorError::Provider(format!(
                "Yahoo Finance returned status {} for {}: {}",
                status, symbol, detail
            ))
            .into());
        }

        Ok(body)
    }
}

impl MarketDataSource for YahooClient {
    async fn dividends(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DividendEvent>> {
        info!("Fetching dividends for {} from Yahoo Finance", ticker);
        let body = self.fetch_chart(ticker, from, to, true).await?;
        let events = parse_dividends(&body)?;
        debug!("{}: {} dividend events", ticker, events.len());
        Ok(events)
    }

    async fn daily_quotes(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>> {
        info!(
            "Fetching daily quotes for {} from {} to {}",
            ticker, from, to
        );
        let body = self.fetch_chart(ticker, from, to, false).await?;
        let quotes = parse_daily_quotes(&body)?;
        debug!("{}: {} daily quotes", ticker, quotes.len());
        Ok(quotes)
    }
}

/// Unix timestamps covering `from` 00:00:00 through `to` 23:59:59 UTC.
fn unix_range(from: NaiveDate, to: NaiveDate) -> (i64, i64) {
    let start = from.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
    let end = to.and_time(chrono::NaiveTime::MIN).and_utc().timestamp() + 86_399;
    (start, end)
}

/// Decode the chart envelope and return its single result.
fn chart_result(body: &str) -> Result<ChartResult> {
    let data: YahooChartResponse =
        serde_json::from_str(body).context("Failed to parse Yahoo Finance response")?;

    if let Some(error) = data.chart.error {
        return Err(CollectorError::Provider(format!(
            "Yahoo Finance API error: {} - {}",
            error.code, error.description
        ))
        .into());
    }

    data.chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| CollectorError::Provider("No data returned from Yahoo Finance".into()).into())
}

/// Exchange-local calendar date of a Yahoo timestamp.
fn local_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate> {
    chrono::DateTime::from_timestamp(timestamp + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| anyhow!("Invalid timestamp: {}", timestamp))
}

fn gmtoffset(result: &ChartResult) -> i64 {
    result
        .meta
        .as_ref()
        .and_then(|meta| meta.gmtoffset)
        .unwrap_or(0)
}

/// Parse the dividend events of a chart response, ordered by date.
///
/// A response without an `events.dividends` map means the ticker paid no
/// dividends in the range. A missing amount is reported as NaN so the caller
/// can log and discard it.
pub fn parse_dividends(body: &str) -> Result<Vec<DividendEvent>> {
    let result = chart_result(body)?;
    let offset = gmtoffset(&result);

    let entries = match result.events.and_then(|events| events.dividends) {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };

    let mut events = entries
        .into_values()
        .map(|entry| {
            Ok(DividendEvent {
                date: local_date(entry.date, offset)?,
                amount: entry.amount.unwrap_or(f64::NAN),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    events.sort_by_key(|event| event.date);
    Ok(events)
}

/// Parse the daily bars of a chart response.
///
/// Bars where every field is null (holidays, suspended sessions) are dropped.
/// A response without timestamps yields an empty history.
pub fn parse_daily_quotes(body: &str) -> Result<Vec<DailyQuote>> {
    let result = chart_result(body)?;
    let offset = gmtoffset(&result);

    let timestamps = match result.timestamp {
        Some(timestamps) => timestamps,
        None => return Ok(Vec::new()),
    };

    let quote = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .ok_or_else(|| anyhow!("No quote data"))?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut quotes = Vec::with_capacity(timestamps.len());

    for (i, &timestamp) in timestamps.iter().enumerate() {
        let bar = DailyQuote {
            date: local_date(timestamp, offset)?,
            open: opens.get(i).copied().flatten(),
            high: highs.get(i).copied().flatten(),
            low: lows.get(i).copied().flatten(),
            close: closes.get(i).copied().flatten(),
            volume: volumes.get(i).copied().flatten(),
        };

        if bar.open.is_none()
            && bar.high.is_none()
            && bar.low.is_none()
            && bar.close.is_none()
            && bar.volume.is_none()
        {
            continue;
        }

        quotes.push(bar);
    }

    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn should_skip_online_tests() -> bool {
        std::env::var("B3_DIVIDENDS_SKIP_ONLINE_TESTS")
            .map(|v| v != "0")
            .unwrap_or(false)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DIVIDENDS_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "BRL", "symbol": "PETR4.SA", "gmtoffset": -10800},
                "timestamp": [1704801600],
                "events": {
                    "dividends": {
                        "1716897600": {"amount": 0.94, "date": 1716897600},
                        "1703073600": {"amount": 1.05, "date": 1703073600},
                        "1708603200": {"amount": null, "date": 1708603200}
                    }
                },
                "indicators": {"quote": [{}]}
            }],
            "error": null
        }
    }"#;

    const QUOTES_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "BRL", "symbol": "VALE3.SA", "gmtoffset": -10800},
                "timestamp": [1704200400, 1704286800, 1704373200],
                "indicators": {
                    "quote": [{
                        "open": [68.5, null, 67.1],
                        "high": [69.0, null, 67.9],
                        "low": [68.1, null, 66.4],
                        "close": [68.9, null, 66.8],
                        "volume": [20345600, null, 18800100]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_dividends_sorted_by_local_date() {
        let events = parse_dividends(DIVIDENDS_BODY).unwrap();
        assert_eq!(events.len(), 3);
        // 1703073600 is 2023-12-20 12:00 UTC, 09:00 in Sao Paulo
        assert_eq!(events[0].date, date(2023, 12, 20));
        assert_eq!(events[0].amount, 1.05);
        assert_eq!(events[1].date, date(2024, 2, 22));
        assert!(events[1].amount.is_nan());
        assert_eq!(events[2].date, date(2024, 5, 28));
        assert_eq!(events[2].amount, 0.94);
    }

    #[test]
    fn test_parse_dividends_without_events_is_empty() {
        let body = r#"{"chart": {"result": [{"meta": {"gmtoffset": -10800}}], "error": null}}"#;
        assert!(parse_dividends(body).unwrap().is_empty());
    }

    #[test]
    fn test_gmtoffset_moves_late_utc_timestamps_back_a_day() {
        // 2024-01-02 01:00 UTC is still 2024-01-01 in Sao Paulo
        let body = r#"{"chart": {"result": [{
            "meta": {"gmtoffset": -10800},
            "events": {"dividends": {"1704157200": {"amount": 0.5, "date": 1704157200}}}
        }], "error": null}}"#;
        let events = parse_dividends(body).unwrap();
        assert_eq!(events[0].date, date(2024, 1, 1));
    }

    #[test]
    fn test_parse_chart_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = parse_dividends(body).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
        assert!(err.downcast_ref::<CollectorError>().is_some());
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_daily_quotes("<html>rate limited</html>").is_err());
    }

    #[test]
    fn test_parse_daily_quotes_drops_empty_bars() {
        let quotes = parse_daily_quotes(QUOTES_BODY).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, date(2024, 1, 2));
        assert_eq!(quotes[0].open, Some(68.5));
        assert_eq!(quotes[0].close, Some(68.9));
        assert_eq!(quotes[0].volume, Some(20345600));
        assert_eq!(quotes[1].date, date(2024, 1, 4));
        assert_eq!(quotes[1].low, Some(66.4));
    }

    #[test]
    fn test_parse_daily_quotes_without_timestamps_is_empty() {
        let body = r#"{"chart": {"result": [{"meta": {"gmtoffset": -10800}, "indicators": {"quote": [{}]}}], "error": null}}"#;
        assert!(parse_daily_quotes(body).unwrap().is_empty());
    }

    #[test]
    fn test_chart_url() {
        let client = YahooClient::with_base_url("https://example.test/").unwrap();
        let url = client.chart_url("PETR4.SA", date(2024, 1, 1), date(2024, 12, 31), true);
        assert_eq!(
            url,
            "https://example.test/v8/finance/chart/PETR4.SA?period1=1704067200&period2=1735689599&interval=1d&events=div"
        );
    }

    #[tokio::test]
    async fn test_fetch_dividends_online() {
        if should_skip_online_tests() {
            return;
        }

        let client = YahooClient::new().unwrap();
        let result = client
            .dividends("PETR4", date(2023, 1, 1), date(2023, 12, 31))
            .await;
        if let Err(e) = &result {
            eprintln!("Skipping Yahoo dividends test: {}", e);
            return;
        }
        let events = result.unwrap();
        assert!(events.iter().all(|e| e.date.format("%Y").to_string() == "2023"));
        println!("PETR4 paid {} dividends in 2023", events.len());
    }

    #[tokio::test]
    async fn test_fetch_daily_quotes_online() {
        if should_skip_online_tests() {
            return;
        }

        let client = YahooClient::new().unwrap();
        let result = client
            .daily_quotes("VALE3", date(2024, 1, 1), date(2024, 1, 10))
            .await;
        if let Err(e) = &result {
            eprintln!("Skipping Yahoo daily quotes test: {}", e);
            return;
        }
        let quotes = result.unwrap();
        assert!(!quotes.is_empty());
        println!("Fetched {} daily quotes", quotes.len());
    }
}
