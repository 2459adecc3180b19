//! B3 Dividends - dividend and daily quote collector for Brazilian stocks
//!
//! This library fetches dividend and price history for B3 tickers from Yahoo
//! Finance, aggregates and ranks annual dividends, and writes the results to
//! semicolon separated CSV files.

pub mod cli;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod logging;
pub mod pricing;
pub mod reports;
pub mod tickers;
pub mod ui;
pub mod utils;
