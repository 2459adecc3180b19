//! Per-ticker collection loops
//!
//! Both phases walk the ticker list sequentially, wrap each provider call in
//! [`with_retries`] and log-and-skip tickers that keep failing, so one bad
//! ticker never aborts a run.

pub mod dividends;
pub mod quotes;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::Result;

pub use dividends::{
    aggregate_annual, collect_dividends, AnnualDividend, DividendCollection, DividendRecord,
    DividendSummary,
};
pub use quotes::{collect_quotes, QuoteCollection, QuoteRecord, QuoteSummary};

/// How often and how patiently a ticker is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per ticker, at least one
    pub max_attempts: u32,
    /// Pause after a successful request; failed attempts wait twice as long
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Wait before the next attempt after a failure.
    pub fn backoff(&self) -> Duration {
        self.delay * 2
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted.
///
/// Intermediate failures are logged as warnings; the last error is returned
/// with the attempt count attached.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    ticker: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(
                    "Error collecting {} for {} (attempt {}/{}): {:#}",
                    what, ticker, attempt, attempts, e
                );
                sleep(policy.backoff()).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e.context(format!(
                    "collecting {} for {} failed after {} attempts",
                    what, ticker, attempts
                )));
            }
        }
    }
}
