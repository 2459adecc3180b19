//! Collector configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML file
//! and command-line overrides (applied by the CLI layer).

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::collector::RetryPolicy;
use crate::error::{CollectorError, Result};

const CONFIG_DIR_NAME: &str = "b3-dividends";
const CONFIG_FILENAME: &str = "config.toml";

/// Full configuration of a collection run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Attempts per ticker before giving up on it
    pub max_retries: u32,
    /// Pause after each successful request; retries wait twice as long
    pub request_delay_ms: u64,
    pub output_dir: PathBuf,
    /// Log file path; an empty path disables file logging
    pub log_file: PathBuf,
    /// Ranks shown per year in the top payers report
    pub top_n: u32,
    /// Tickers shown in the consistent payers report
    pub consistent_n: usize,
    /// Explicit ticker universe, replaces the built-in list
    pub tickers: Option<Vec<String>>,
    /// File with one or more tickers per line, replaces the built-in list
    pub tickers_file: Option<PathBuf>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            start_year: 2015,
            end_year: 2024,
            max_retries: 3,
            request_delay_ms: 500,
            output_dir: PathBuf::from("data"),
            log_file: PathBuf::from("logs/collector.log"),
            top_n: 5,
            consistent_n: 10,
            tickers: None,
            tickers_file: None,
        }
    }
}

impl CollectorConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse collector config TOML")
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(CollectorError::Config("max_retries must be at least 1".into()).into());
        }
        if self.top_n == 0 {
            return Err(CollectorError::Config("top_n must be at least 1".into()).into());
        }
        if self.consistent_n == 0 {
            return Err(CollectorError::Config("consistent_n must be at least 1".into()).into());
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.request_delay_ms),
        )
    }

    /// The requested period, validated against today's date.
    pub fn period(&self) -> Period {
        Period::normalized(self.start_year, self.end_year, Local::now().year())
    }

    /// Log file path, or `None` when file logging is disabled.
    pub fn log_path(&self) -> Option<&Path> {
        if self.log_file.as_os_str().is_empty() {
            None
        } else {
            Some(self.log_file.as_path())
        }
    }
}

/// Per-user config file location, e.g. `~/.config/b3-dividends/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

/// Inclusive range of calendar years covered by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start_year: i32,
    pub end_year: i32,
}

impl Period {
    /// Build a period, clamping the end year to `current_year` and swapping
    /// the bounds when they are inverted.
    pub fn normalized(start_year: i32, end_year: i32, current_year: i32) -> Self {
        let mut start_year = start_year;
        let mut end_year = end_year;

        if end_year > current_year {
            warn!(
                "End year ({}) is after the current year. Adjusting to {}.",
                end_year, current_year
            );
            end_year = current_year;
        }

        if start_year > end_year {
            error!(
                "Start year ({}) is after end year ({}). Swapping.",
                start_year, end_year
            );
            std::mem::swap(&mut start_year, &mut end_year);
        }

        Self {
            start_year,
            end_year,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }

    /// January 1st of the start year.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// December 31st of the end year.
    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end_year, 12, 31).unwrap_or(NaiveDate::MAX)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}
