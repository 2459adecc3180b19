use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::collector::{AnnualDividend, DividendCollection, DividendRecord};

/// Statistics over every collected dividend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub count: usize,
    pub total: Decimal,
    pub mean: Decimal,
    pub max_value: Decimal,
    pub max_ticker: String,
    pub max_date: NaiveDate,
}

/// Aggregates of the dividends paid in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub total: Decimal,
    pub mean: Decimal,
    pub count: usize,
    pub distinct_tickers: usize,
}

/// Largest payers of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearTopPayers {
    pub year: i32,
    /// Rows with `rank <= top_n`, in rank order
    pub payers: Vec<AnnualDividend>,
}

/// A ticker that paid dividends in many distinct years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistentPayer {
    pub ticker: String,
    pub years: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividendStatistics {
    pub overall: OverallStats,
    pub by_year: Vec<YearSummary>,
    pub top_payers: Vec<YearTopPayers>,
    pub consistent_payers: Vec<ConsistentPayer>,
}

impl DividendStatistics {
    /// Compute every report for a collection; `None` when it is empty.
    pub fn compute(
        collection: &DividendCollection,
        top_n: u32,
        consistent_n: usize,
    ) -> Option<Self> {
        let overall = overall_stats(&collection.records)?;
        let top_payers = top_payers_by_year(&collection.annual, top_n)
            .into_iter()
            .filter(|top| collection.period.contains(top.year))
            .collect();

        Some(Self {
            overall,
            by_year: summarize_by_year(&collection.records),
            top_payers,
            consistent_payers: consistent_payers(&collection.annual, consistent_n),
        })
    }
}

/// Count, total, mean and the first maximum in record order.
pub fn overall_stats(records: &[DividendRecord]) -> Option<OverallStats> {
    let first = records.first()?;
    let mut max = first;
    let mut total = Decimal::ZERO;
    for record in records {
        total += record.value;
        if record.value > max.value {
            max = record;
        }
    }

    Some(OverallStats {
        count: records.len(),
        total,
        mean: total / Decimal::from(records.len()),
        max_value: max.value,
        max_ticker: max.ticker.clone(),
        max_date: max.date,
    })
}

/// Per-year total, mean, count and distinct payers, in year order.
pub fn summarize_by_year(records: &[DividendRecord]) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, Vec<&DividendRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year()).or_default().push(record);
    }

    by_year
        .into_iter()
        .map(|(year, rows)| {
            let total: Decimal = rows.iter().map(|r| r.value).sum();
            YearSummary {
                year,
                total,
                mean: total / Decimal::from(rows.len()),
                count: rows.len(),
                distinct_tickers: rows.iter().map(|r| r.ticker.as_str()).unique().count(),
            }
        })
        .collect()
}

/// Annual rows ranked within `top_n`, grouped by year.
///
/// `annual` must be ordered by year then rank, as the collector produces it.
pub fn top_payers_by_year(annual: &[AnnualDividend], top_n: u32) -> Vec<YearTopPayers> {
    annual
        .iter()
        .chunk_by(|row| row.year)
        .into_iter()
        .map(|(year, rows)| YearTopPayers {
            year,
            payers: rows.filter(|row| row.rank <= top_n).cloned().collect(),
        })
        .filter(|top| !top.payers.is_empty())
        .collect()
}

/// Tickers by number of paying years, then accumulated total, then name.
pub fn consistent_payers(annual: &[AnnualDividend], limit: usize) -> Vec<ConsistentPayer> {
    let mut per_ticker: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for row in annual {
        let entry = per_ticker.entry(row.ticker.as_str()).or_default();
        entry.0 += 1;
        entry.1 += row.total;
    }

    per_ticker
        .into_iter()
        .map(|(ticker, (years, total))| ConsistentPayer {
            ticker: ticker.to_string(),
            years,
            total,
        })
        .sorted_by(|a, b| {
            b.years
                .cmp(&a.years)
                .then(b.total.cmp(&a.total))
                .then(a.ticker.cmp(&b.ticker))
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{aggregate_annual, DividendSummary};
    use crate::config::Period;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(ticker: &str, date: NaiveDate, value: Decimal) -> DividendRecord {
        DividendRecord {
            ticker: ticker.to_string(),
            date,
            value,
        }
    }

    /// Fixed sample, ordered by ticker then date like the collector output.
    fn sample() -> Vec<DividendRecord> {
        vec![
            record("BBAS3", date(2022, 3, 1), dec!(0.8)),
            record("BBAS3", date(2023, 3, 1), dec!(1.2)),
            record("ITSA4", date(2022, 6, 1), dec!(0.02)),
            record("ITSA4", date(2022, 12, 1), dec!(0.18)),
            record("PETR4", date(2022, 8, 1), dec!(3.5)),
            record("PETR4", date(2023, 8, 1), dec!(3.5)),
            record("TAEE11", date(2023, 5, 1), dec!(1.3)),
        ]
    }

    fn collection(records: Vec<DividendRecord>) -> DividendCollection {
        let annual = aggregate_annual(&records);
        DividendCollection {
            period: Period {
                start_year: 2022,
                end_year: 2023,
            },
            records,
            annual,
            summary: DividendSummary::default(),
            paying_tickers: Vec::new(),
        }
    }

    #[test]
    fn test_overall_stats() {
        let stats = overall_stats(&sample()).unwrap();
        assert_eq!(stats.count, 7);
        assert_eq!(stats.total, dec!(10.5));
        assert_eq!(stats.mean, dec!(1.5));
        assert_eq!(stats.max_value, dec!(3.5));
        // First maximum in record order wins
        assert_eq!(stats.max_ticker, "PETR4");
        assert_eq!(stats.max_date, date(2022, 8, 1));
    }

    #[test]
    fn test_overall_stats_empty() {
        assert!(overall_stats(&[]).is_none());
    }

    #[test]
    fn test_summarize_by_year() {
        let years = summarize_by_year(&sample());
        assert_eq!(
            years,
            vec![
                YearSummary {
                    year: 2022,
                    total: dec!(4.5),
                    mean: dec!(1.125),
                    count: 4,
                    distinct_tickers: 3,
                },
                YearSummary {
                    year: 2023,
                    total: dec!(6.0),
                    mean: dec!(2.0),
                    count: 3,
                    distinct_tickers: 3,
                },
            ]
        );
    }

    #[test]
    fn test_top_payers_respects_rank_limit() {
        let annual = aggregate_annual(&sample());
        let top = top_payers_by_year(&annual, 2);

        let names = |year: usize| -> Vec<(&str, u32)> {
            top[year]
                .payers
                .iter()
                .map(|p| (p.ticker.as_str(), p.rank))
                .collect()
        };
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].year, 2022);
        assert_eq!(names(0), vec![("PETR4", 1), ("BBAS3", 2)]);
        assert_eq!(top[1].year, 2023);
        assert_eq!(names(1), vec![("PETR4", 1), ("TAEE11", 2)]);
    }

    #[test]
    fn test_consistent_payers_order() {
        let annual = aggregate_annual(&sample());
        let payers = consistent_payers(&annual, 3);
        let rows: Vec<(&str, usize, Decimal)> = payers
            .iter()
            .map(|p| (p.ticker.as_str(), p.years, p.total))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("PETR4", 2, dec!(7.0)),
                ("BBAS3", 2, dec!(2.0)),
                ("TAEE11", 1, dec!(1.3)),
            ]
        );
    }

    #[test]
    fn test_compute_full_report() {
        let stats = DividendStatistics::compute(&collection(sample()), 5, 10).unwrap();
        assert_eq!(stats.overall.count, 7);
        assert_eq!(stats.by_year.len(), 2);
        assert_eq!(stats.top_payers[0].payers.len(), 3);
        assert_eq!(stats.consistent_payers.len(), 4);
    }

    #[test]
    fn test_compute_empty_collection() {
        assert!(DividendStatistics::compute(&collection(Vec::new()), 5, 10).is_none());
    }
}
