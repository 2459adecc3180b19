//! Utility functions for rounding and formatting
//!
//! This module provides centralized helpers for turning provider floats into
//! decimals and for consistent display of currency and decimal values, both
//! in terminal output and in the CSV files.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places kept for every monetary value written or aggregated.
pub const MONEY_DP: u32 = 4;

/// Date format used in every CSV file and log line (dd-mm-yyyy).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Convert a provider float into a Decimal.
///
/// Goes through the shortest round-trip text form of the float, so `0.1`
/// becomes exactly `0.1` instead of its binary expansion. Returns `None` for
/// NaN, infinities and values outside the Decimal range.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Round to four decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use b3_dividends::utils::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(0.12345)), dec!(0.1235));
/// assert_eq!(round_money(dec!(1.00004)), dec!(1.0000));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a value with a fixed number of decimals and a decimal comma,
/// without thousands separators. This is the CSV cell format.
///
/// # Examples
/// ```
/// use b3_dividends::utils::format_decimal_comma;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal_comma(dec!(1234.5), 4), "1234,5000");
/// assert_eq!(format_decimal_comma(dec!(0.33335), 4), "0,3334");
/// ```
pub fn format_decimal_comma(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.prec$}", rounded, prec = decimals as usize).replace('.', ",")
}

/// Format a date as dd-mm-yyyy.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a value as Brazilian Real: `R$ ` prefix, `.` thousands
/// separator and `,` decimal separator, rounded half away from zero.
///
/// # Examples
/// ```
/// use b3_dividends::utils::format_brl;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_brl(dec!(1234.56), 2), "R$ 1.234,56");
/// assert_eq!(format_brl(dec!(0.451234), 4), "R$ 0,4512");
/// ```
pub fn format_brl(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;
    let formatted = format!("{:.prec$}", rounded.abs(), prec = decimals as usize);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    // Add thousands separators (.) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    match decimal_part {
        Some(frac) => format!("R$ {}{},{}", sign, with_separators, frac),
        None => format!("R$ {}{}", sign, with_separators),
    }
}

// ============ Convenience functions ============

/// Format as Brazilian Real with two decimals: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use b3_dividends::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_brl(value, 2)
}

/// Format as Brazilian Real with four decimals, the precision used for
/// per-share dividend amounts: "R$ 0,4512"
pub fn format_currency_precise(value: Decimal) -> String {
    format_brl(value, MONEY_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_currency(dec!(0.99)), "R$ 0,99");
        assert_eq!(format_currency(dec!(1000000)), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_currency_rounds_half_up() {
        assert_eq!(format_currency(dec!(1.235)), "R$ 1,24");
        assert_eq!(format_currency(dec!(1.234)), "R$ 1,23");
        assert_eq!(format_currency(dec!(999.995)), "R$ 1.000,00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "R$ -1.234,56");
        assert_eq!(format_currency(dec!(-0.01)), "R$ -0,01");
    }

    #[test]
    fn test_format_currency_precise() {
        assert_eq!(format_currency_precise(dec!(0.45123)), "R$ 0,4512");
        assert_eq!(format_currency_precise(dec!(1234.5)), "R$ 1.234,5000");
    }

    #[test]
    fn test_format_brl_whole_units() {
        assert_eq!(format_brl(dec!(1000000), 0), "R$ 1.000.000");
        assert_eq!(format_brl(dec!(-999.5), 0), "R$ -1.000");
    }

    #[test]
    fn test_decimal_from_f64_uses_shortest_repr() {
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
        assert_eq!(decimal_from_f64(0.35), Some(dec!(0.35)));
        assert_eq!(decimal_from_f64(12.0), Some(dec!(12)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(0.00005)), dec!(0.0001));
        assert_eq!(round_money(dec!(0.00004)), dec!(0.0000));
        assert_eq!(round_money(dec!(2.71828)), dec!(2.7183));
    }

    #[test]
    fn test_format_decimal_comma() {
        assert_eq!(format_decimal_comma(dec!(0), 4), "0,0000");
        assert_eq!(format_decimal_comma(dec!(12.3), 4), "12,3000");
        assert_eq!(format_decimal_comma(dec!(-0.5), 2), "-0,50");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "07-03-2024");
    }
}
