//! In-memory market data source for collector tests.

use anyhow::anyhow;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::pricing::{DailyQuote, DividendEvent, MarketDataSource};

/// Answers from fixed tables; a ticker registered with [`FakeSource::failing`]
/// errors that many times before answering.
#[derive(Default)]
pub struct FakeSource {
    dividends: HashMap<String, Vec<DividendEvent>>,
    quotes: HashMap<String, Vec<DailyQuote>>,
    failures: HashMap<String, u32>,
    calls: RefCell<HashMap<String, u32>>,
}

impl FakeSource {
    pub fn with_dividends(mut self, ticker: &str, events: Vec<(NaiveDate, f64)>) -> Self {
        self.dividends.insert(
            ticker.to_string(),
            events
                .into_iter()
                .map(|(date, amount)| DividendEvent { date, amount })
                .collect(),
        );
        self
    }

    pub fn with_quotes(mut self, ticker: &str, quotes: Vec<DailyQuote>) -> Self {
        self.quotes.insert(ticker.to_string(), quotes);
        self
    }

    pub fn failing(mut self, ticker: &str, times: u32) -> Self {
        self.failures.insert(ticker.to_string(), times);
        self
    }

    pub fn calls(&self, ticker: &str) -> u32 {
        self.calls.borrow().get(ticker).copied().unwrap_or(0)
    }

    fn record_call(&self, ticker: &str) -> Result<()> {
        let call = {
            let mut calls = self.calls.borrow_mut();
            let count = calls.entry(ticker.to_string()).or_default();
            *count += 1;
            *count
        };
        if call <= self.failures.get(ticker).copied().unwrap_or(0) {
            return Err(anyhow!("simulated network error for {}", ticker));
        }
        Ok(())
    }
}

impl MarketDataSource for FakeSource {
    async fn dividends(
        &self,
        ticker: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<DividendEvent>> {
        self.record_call(ticker)?;
        Ok(self.dividends.get(ticker).cloned().unwrap_or_default())
    }

    async fn daily_quotes(
        &self,
        ticker: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<DailyQuote>> {
        self.record_call(ticker)?;
        Ok(self.quotes.get(ticker).cloned().unwrap_or_default())
    }
}
