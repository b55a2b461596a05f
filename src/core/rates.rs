//! Manual rate table and conversion arithmetic.
//!
//! All stored amounts are denominated in the table's base currency.
//! Factors express "1 unit of base = factor units of this currency" and
//! are loaded once from configuration; the table is immutable for the
//! rest of the session. A reload replaces the table wholesale.

use crate::core::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RateTable {
    base: String,
    factors: HashMap<String, f64>,
}

impl RateTable {
    /// Builds a table, enforcing that the base factor is exactly 1 and
    /// every factor is finite and positive.
    pub fn new(base: &str, factors: HashMap<String, f64>) -> Result<Self> {
        let base = base.trim().to_uppercase();
        if base.is_empty() {
            return Err(Error::InvalidRateTable("empty base currency".to_string()));
        }

        let mut normalized = HashMap::with_capacity(factors.len() + 1);
        for (code, factor) in factors {
            let code = code.trim().to_uppercase();
            if !factor.is_finite() || factor <= 0.0 {
                return Err(Error::InvalidRateTable(format!(
                    "factor for {code} must be finite and positive, got {factor}"
                )));
            }
            normalized.insert(code, factor);
        }

        match normalized.get(&base) {
            Some(factor) if *factor != 1.0 => {
                return Err(Error::InvalidRateTable(format!(
                    "base currency {base} must have factor 1, got {factor}"
                )));
            }
            Some(_) => {}
            None => {
                normalized.insert(base.clone(), 1.0);
            }
        }

        Ok(RateTable {
            base,
            factors: normalized,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Supported codes, sorted for deterministic listing.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.factors.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    fn factor(&self, code: &str) -> Result<f64> {
        self.factors
            .get(code)
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(code.to_string()))
    }

    /// Converts `amount` between two configured currencies. Identity
    /// when the codes match; otherwise through the base. A code missing
    /// from the table is a distinct failure, never a guessed factor.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Ok(amount);
        }
        let amount_in_base = amount / self.factor(&from)?;
        Ok(amount_in_base * self.factor(&to)?)
    }

    /// Converts a base-denominated amount into the display currency.
    pub fn to_display(&self, amount_in_base: f64, currency: &str) -> Result<f64> {
        self.convert(amount_in_base, &self.base, currency)
    }

    /// Renders a base-denominated amount in the requested currency,
    /// with symbol, grouping, and two fraction digits.
    pub fn format(&self, amount_in_base: f64, currency: &str) -> Result<String> {
        let converted = self.to_display(amount_in_base, currency)?;
        Ok(display_amount(converted, currency))
    }
}

impl Default for RateTable {
    /// The fixed manual table: INR base, no network fetch.
    fn default() -> Self {
        let factors = HashMap::from([
            ("INR".to_string(), 1.0),
            ("USD".to_string(), 0.0113),
            ("EUR".to_string(), 0.0098),
            ("GBP".to_string(), 0.0083),
            ("JPY".to_string(), 1.24),
            ("CAD".to_string(), 0.0141),
            ("AUD".to_string(), 0.0153),
        ]);
        RateTable::new("INR", factors).expect("manual rate table is valid")
    }
}

/// Formats an already-converted amount for display. Two fraction
/// digits for every supported currency; INR uses Indian digit grouping,
/// everything else Western grouping.
pub fn display_amount(amount: f64, currency: &str) -> String {
    let currency = currency.trim().to_uppercase();
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (integral, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = if currency == "INR" {
        group_indian(integral)
    } else {
        group_western(integral)
    };

    let sign = if negative { "-" } else { "" };
    match symbol(&currency) {
        Some(sym) => format!("{sign}{sym}{grouped}.{fraction}"),
        None => format!("{sign}{currency} {grouped}.{fraction}"),
    }
}

fn symbol(code: &str) -> Option<&'static str> {
    match code {
        "INR" => Some("₹"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "CAD" => Some("C$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

// 1234567 -> 1,234,567
fn group_western(digits: &str) -> String {
    group_from_right(digits, |_| 3)
}

// 1234567 -> 12,34,567 (last group of 3, then pairs)
fn group_indian(digits: &str) -> String {
    group_from_right(digits, |taken| if taken == 0 { 3 } else { 2 })
}

fn group_from_right(digits: &str, width: impl Fn(usize) -> usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut groups: Vec<String> = Vec::new();
    let mut index = chars.len();
    let mut taken = 0;
    while index > 0 {
        let take = width(taken).min(index);
        groups.push(chars[index - take..index].iter().collect());
        index -= take;
        taken += take;
    }
    groups.reverse();
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_exact_for_every_code() {
        let rates = RateTable::default();
        for code in rates.codes() {
            assert_eq!(rates.convert(123.456, code, code).unwrap(), 123.456);
        }
    }

    #[test]
    fn round_trip_is_close_to_identity() {
        let rates = RateTable::default();
        let codes = rates.codes();
        for from in &codes {
            for to in &codes {
                let there = rates.convert(987.65, from, to).unwrap();
                let back = rates.convert(there, to, from).unwrap();
                assert!(
                    (back - 987.65).abs() < 1e-9,
                    "{from}->{to} round trip drifted: {back}"
                );
            }
        }
    }

    #[test]
    fn zero_converts_to_zero() {
        let rates = RateTable::default();
        assert_eq!(rates.convert(0.0, "INR", "USD").unwrap(), 0.0);
        assert_eq!(rates.convert(0.0, "JPY", "GBP").unwrap(), 0.0);
    }

    #[test]
    fn converts_through_the_base() {
        let rates = RateTable::default();
        let usd = rates.convert(1000.0, "INR", "USD").unwrap();
        assert!((usd - 11.3).abs() < 1e-9);

        // USD -> EUR goes back through INR
        let eur = rates.convert(11.3, "USD", "EUR").unwrap();
        assert!((eur - 9.8).abs() < 1e-9);
    }

    #[test]
    fn unknown_code_is_a_distinct_error() {
        let rates = RateTable::default();
        match rates.convert(10.0, "INR", "CHF") {
            Err(Error::UnknownCurrency(code)) => assert_eq!(code, "CHF"),
            other => panic!("expected UnknownCurrency, got {other:?}"),
        }
        match rates.convert(10.0, "XXX", "INR") {
            Err(Error::UnknownCurrency(code)) => assert_eq!(code, "XXX"),
            other => panic!("expected UnknownCurrency, got {other:?}"),
        }
    }

    #[test]
    fn unknown_code_identity_still_short_circuits() {
        // from == to returns the amount before any table lookup
        let rates = RateTable::default();
        assert_eq!(rates.convert(5.0, "CHF", "CHF").unwrap(), 5.0);
    }

    #[test]
    fn base_factor_is_injected_when_missing() {
        let rates =
            RateTable::new("INR", HashMap::from([("USD".to_string(), 0.0113)])).unwrap();
        assert_eq!(rates.convert(100.0, "INR", "INR").unwrap(), 100.0);
        assert!((rates.convert(100.0, "INR", "USD").unwrap() - 1.13).abs() < 1e-12);
    }

    #[test]
    fn base_factor_other_than_one_is_rejected() {
        let result = RateTable::new("INR", HashMap::from([("INR".to_string(), 2.0)]));
        assert!(matches!(result, Err(Error::InvalidRateTable(_))));
    }

    #[test]
    fn non_positive_factors_are_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = RateTable::new("INR", HashMap::from([("USD".to_string(), bad)]));
            assert!(matches!(result, Err(Error::InvalidRateTable(_))), "{bad}");
        }
    }

    #[test]
    fn codes_are_case_insensitive() {
        let rates = RateTable::default();
        let usd = rates.convert(1000.0, "inr", "usd").unwrap();
        assert!((usd - 11.3).abs() < 1e-9);
    }

    #[test]
    fn format_converts_from_base() {
        let rates = RateTable::default();
        assert_eq!(rates.format(1000.0, "USD").unwrap(), "$11.30");
        assert_eq!(rates.format(1000.0, "INR").unwrap(), "₹1,000.00");
    }

    #[test]
    fn display_uses_indian_grouping_for_inr() {
        assert_eq!(display_amount(1234567.89, "INR"), "₹12,34,567.89");
        assert_eq!(display_amount(1234567.89, "USD"), "$1,234,567.89");
        assert_eq!(display_amount(999.5, "INR"), "₹999.50");
    }

    #[test]
    fn display_handles_negative_and_unknown_codes() {
        assert_eq!(display_amount(-450.0, "INR"), "-₹450.00");
        assert_eq!(display_amount(12.5, "CHF"), "CHF 12.50");
    }
}
