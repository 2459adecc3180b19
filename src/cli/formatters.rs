//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::collector::{DividendSummary, QuoteSummary};
use crate::reports::DividendStatistics;
use crate::utils::{format_currency, format_currency_precise, format_date};

/// Format any report as pretty JSON
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format dividend statistics for terminal output
pub fn format_statistics_table(stats: &DividendStatistics) -> String {
    let mut output = String::new();
    let overall = &stats.overall;

    output.push_str(&format!("\n{} Dividend statistics\n\n", "📊".cyan().bold()));
    output.push_str(&format!(
        "  Average dividend: {}\n",
        format_currency_precise(overall.mean)
    ));
    output.push_str(&format!(
        "  Total dividends:  {}\n",
        format_currency(overall.total).green()
    ));
    output.push_str(&format!(
        "  Largest dividend: {} ({}, {})\n",
        format_currency_precise(overall.max_value),
        overall.max_ticker.bold(),
        format_date(overall.max_date)
    ));

    #[derive(Tabled)]
    struct YearRow {
        #[tabled(rename = "Year")]
        year: i32,
        #[tabled(rename = "Total")]
        total: String,
        #[tabled(rename = "Average")]
        mean: String,
        #[tabled(rename = "Dividends")]
        count: usize,
        #[tabled(rename = "Payers")]
        payers: usize,
    }

    let rows: Vec<YearRow> = stats
        .by_year
        .iter()
        .map(|y| YearRow {
            year: y.year,
            total: format_currency(y.total),
            mean: format_currency_precise(y.mean),
            count: y.count,
            payers: y.distinct_tickers,
        })
        .collect();

    output.push_str(&format!("\n{} Dividends per year\n\n", "📅".cyan().bold()));
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    output.push_str(&table);
    output.push('\n');

    if !stats.top_payers.is_empty() {
        output.push_str(&format!(
            "\n{} Largest payers per year\n",
            "🏆".cyan().bold()
        ));
        for year in &stats.top_payers {
            output.push_str(&format!("\n  {}\n", year.year.to_string().bold()));
            for payer in &year.payers {
                output.push_str(&format!(
                    "    {}. {}: {}\n",
                    payer.rank,
                    payer.ticker,
                    format_currency_precise(payer.total)
                ));
            }
        }
    }

    if !stats.consistent_payers.is_empty() {
        #[derive(Tabled)]
        struct ConsistentRow {
            #[tabled(rename = "Ticker")]
            ticker: String,
            #[tabled(rename = "Years paying")]
            years: usize,
            #[tabled(rename = "Accumulated")]
            total: String,
        }

        let rows: Vec<ConsistentRow> = stats
            .consistent_payers
            .iter()
            .map(|p| ConsistentRow {
                ticker: p.ticker.clone(),
                years: p.years,
                total: format_currency_precise(p.total),
            })
            .collect();

        output.push_str(&format!(
            "\n{} Most consistent payers\n\n",
            "🔁".cyan().bold()
        ));
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        output.push_str(&table);
        output.push('\n');
    }

    output
}

/// One-line outcome of the dividend phase
pub fn format_dividend_summary(summary: &DividendSummary, records: usize) -> String {
    let mut line = format!(
        "{} {} tickers processed, {} with dividends, {} dividend records",
        "✓".green().bold(),
        summary.processed,
        summary.with_dividends.to_string().green(),
        records
    );
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed.to_string().red()));
    }
    line
}

/// One-line outcome of the quote phase
pub fn format_quote_summary(summary: &QuoteSummary, rows: usize) -> String {
    let mut line = format!(
        "{} {} tickers processed, {} with quotes, {} daily quotes",
        "✓".green().bold(),
        summary.processed,
        summary.with_quotes.to_string().green(),
        rows
    );
    if summary.without_quotes > 0 {
        line.push_str(&format!(
            ", {} without quotes",
            summary.without_quotes.to_string().yellow()
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::AnnualDividend;
    use crate::reports::{ConsistentPayer, OverallStats, YearSummary, YearTopPayers};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn stats() -> DividendStatistics {
        DividendStatistics {
            overall: OverallStats {
                count: 2,
                total: dec!(4.7),
                mean: dec!(2.35),
                max_value: dec!(3.5),
                max_ticker: "PETR4".to_string(),
                max_date: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
            },
            by_year: vec![YearSummary {
                year: 2023,
                total: dec!(4.7),
                mean: dec!(2.35),
                count: 2,
                distinct_tickers: 2,
            }],
            top_payers: vec![YearTopPayers {
                year: 2023,
                payers: vec![AnnualDividend {
                    year: 2023,
                    ticker: "PETR4".to_string(),
                    total: dec!(3.5),
                    rank: 1,
                }],
            }],
            consistent_payers: vec![ConsistentPayer {
                ticker: "PETR4".to_string(),
                years: 1,
                total: dec!(3.5),
            }],
        }
    }

    #[test]
    fn test_statistics_table_contents() {
        colored::control::set_override(false);
        let output = format_statistics_table(&stats());
        assert!(output.contains("Average dividend: R$ 2,3500"));
        assert!(output.contains("Total dividends:  R$ 4,70"));
        assert!(output.contains("Largest dividend: R$ 3,5000 (PETR4, 01-08-2023)"));
        assert!(output.contains("1. PETR4: R$ 3,5000"));
        assert!(output.contains("Years paying"));
    }

    #[test]
    fn test_statistics_json() {
        let json = format_json(&stats());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["overall"]["max_ticker"], "PETR4");
        assert_eq!(value["by_year"][0]["year"], 2023);
    }

    #[test]
    fn test_summary_lines() {
        colored::control::set_override(false);
        let summary = DividendSummary {
            processed: 3,
            with_dividends: 2,
            failed: 1,
            invalid_values: 0,
        };
        assert_eq!(
            format_dividend_summary(&summary, 5),
            "✓ 3 tickers processed, 2 with dividends, 5 dividend records, 1 failed"
        );
    }
}
