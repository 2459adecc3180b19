use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::tickers::{default_tickers, load_tickers_file, parse_ticker_list};

/// The ticker universe of a run: the configured list, else the tickers file,
/// else the built-in B3 list.
pub fn resolve_tickers(config: &CollectorConfig) -> Result<Vec<String>> {
    let tickers = if let Some(list) = &config.tickers {
        parse_ticker_list(&list.join(","))
    } else if let Some(path) = &config.tickers_file {
        load_tickers_file(path)?
    } else {
        default_tickers()
    };

    if tickers.is_empty() {
        return Err(CollectorError::NoData("no valid tickers to collect".into()).into());
    }
    Ok(tickers)
}

pub fn dispatch_tickers(config: &CollectorConfig, json_output: bool) -> Result<()> {
    let tickers = resolve_tickers(config)?;
    if json_output {
        println!("{}", serde_json::json!(tickers));
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
    }
    Ok(())
}
