//! Error handling for the dividend collector
//!
//! Defines the typed failures of a collection run and establishes a unified
//! Result type using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for collection runs
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no data: {0}")]
    NoData(String),
}

/// Result type alias for collector operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = CollectorError::Provider("Not Found - No data found".to_string());
        assert_eq!(err.to_string(), "provider error: Not Found - No data found");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(anyhow::Error::new(CollectorError::NoData(
            "empty history".to_string(),
        )))
        .context("failed to collect quotes for PETR4");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to collect quotes"));
                let root = e.root_cause().to_string();
                assert_eq!(root, "no data: empty history");
                assert!(e.downcast_ref::<CollectorError>().is_some());
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_collector_error_variants() {
        let config_err = CollectorError::Config("max_retries must be at least 1".to_string());
        assert!(config_err.to_string().starts_with("config error"));

        let result: Result<u32> = Err(config_err.into());
        assert!(matches!(
            result.unwrap_err().downcast_ref::<CollectorError>(),
            Some(CollectorError::Config(_))
        ));
    }
}
