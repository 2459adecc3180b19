//! Reports module - aggregate statistics over collected dividends

pub mod dividends;

pub use dividends::{
    consistent_payers, overall_stats, summarize_by_year, top_payers_by_year, ConsistentPayer,
    DividendStatistics, OverallStats, YearSummary, YearTopPayers,
};
