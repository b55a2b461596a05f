//! Extracts structured fields from OCR output text.
//!
//! The OCR engine itself is an external collaborator; this module only
//! accepts the text it produced and pulls out up to three optional
//! strings (amount, merchant, date) to pre-fill an expense draft.

use crate::core::expense::ExpenseDraft;
use chrono::NaiveDate;
use tracing::debug;

/// Fields recognized in a scanned receipt. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptFields {
    /// Last `N.NN` token in the text; receipts print the grand total
    /// near the bottom.
    pub amount: Option<String>,
    /// First non-empty line.
    pub merchant: Option<String>,
    /// First `d/m/yy` or `d/m/yyyy` style token, as printed.
    pub date: Option<String>,
}

/// Scans OCR text for amount, merchant, and date.
pub fn parse_receipt_text(text: &str) -> ReceiptFields {
    let fields = ReceiptFields {
        amount: last_decimal_token(text),
        merchant: text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string),
        date: first_slashed_date(text),
    };
    debug!(?fields, "Parsed receipt text");
    fields
}

impl ReceiptFields {
    /// Builds a pre-filled draft for review before submission. Missing
    /// fields fall back the way the dashboard form does: a generic
    /// title, zero amount, today's date, category "Other".
    pub fn into_draft(self, today: NaiveDate, currency: &str, owner: &str) -> ExpenseDraft {
        let date = self
            .date
            .as_deref()
            .and_then(parse_slashed_date)
            .unwrap_or(today);
        ExpenseDraft {
            title: self
                .merchant
                .unwrap_or_else(|| "Scanned Receipt".to_string()),
            amount: self
                .amount
                .and_then(|a| a.parse::<f64>().ok())
                .filter(|a| a.is_finite() && *a >= 0.0)
                .unwrap_or(0.0),
            category: "Other".to_string(),
            date,
            location: None,
            notes: None,
            currency: currency.to_string(),
            owner: owner.to_string(),
        }
    }
}

/// Finds the last token shaped like `123.45`, with an optional leading
/// currency sigil which is stripped.
fn last_decimal_token(text: &str) -> Option<String> {
    let mut last = None;
    let bytes: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 2 < bytes.len()
                && bytes[i] == '.'
                && bytes[i + 1].is_ascii_digit()
                && bytes[i + 2].is_ascii_digit()
            {
                // Exactly two fraction digits, as receipts print them.
                let trailing_digits =
                    i + 3 < bytes.len() && bytes[i + 3].is_ascii_digit();
                if !trailing_digits {
                    last = Some(bytes[start..i + 3].iter().collect::<String>());
                }
                i += 3;
            }
        } else {
            i += 1;
        }
    }
    last
}

/// Finds the first `d/m/yy`-style token (1-2 digit day and month, 2 or
/// 4 digit year).
fn first_slashed_date(text: &str) -> Option<String> {
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() != 3 {
            continue;
        }
        let day_month_ok = parts[..2]
            .iter()
            .all(|p| (1..=2).contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit()));
        let year_ok = matches!(parts[2].len(), 2 | 4)
            && parts[2].chars().all(|c| c.is_ascii_digit());
        if day_month_ok && year_ok {
            return Some(token.to_string());
        }
    }
    None
}

fn parse_slashed_date(token: &str) -> Option<NaiveDate> {
    for format in ["%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d/%m/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = "\
WHOLE FOODS MARKET
123 Main Street

Bananas        1.25
Coffee         4.50
Bread          3.20

TOTAL          8.95
08/21/2026 14:32
Thank you!";

    #[test]
    fn extracts_all_three_fields() {
        let fields = parse_receipt_text(RECEIPT);
        assert_eq!(fields.amount.as_deref(), Some("8.95"));
        assert_eq!(fields.merchant.as_deref(), Some("WHOLE FOODS MARKET"));
        assert_eq!(fields.date.as_deref(), Some("08/21/2026"));
    }

    #[test]
    fn amount_is_the_last_decimal_token() {
        let fields = parse_receipt_text("Item 12.00\nItem 3.99\nTOTAL $15.99");
        assert_eq!(fields.amount.as_deref(), Some("15.99"));
    }

    #[test]
    fn tokens_with_extra_fraction_digits_are_skipped() {
        let fields = parse_receipt_text("weight 0.4520 kg\nTOTAL 7.25");
        assert_eq!(fields.amount.as_deref(), Some("7.25"));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(parse_receipt_text(""), ReceiptFields::default());
        assert_eq!(parse_receipt_text("\n  \n"), ReceiptFields::default());
    }

    #[test]
    fn draft_prefills_from_fields() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let draft = parse_receipt_text(RECEIPT).into_draft(today, "INR", "demo-user");

        assert_eq!(draft.title, "WHOLE FOODS MARKET");
        assert_eq!(draft.amount, 8.95);
        assert_eq!(draft.category, "Other");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2026, 8, 21).unwrap());
    }

    #[test]
    fn draft_falls_back_when_fields_are_missing() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let draft = ReceiptFields::default().into_draft(today, "INR", "demo-user");

        assert_eq!(draft.title, "Scanned Receipt");
        assert_eq!(draft.amount, 0.0);
        assert_eq!(draft.date, today);
    }

    #[test]
    fn two_digit_years_parse() {
        let fields = parse_receipt_text("TOTAL 9.00 on 3/5/26");
        assert_eq!(fields.date.as_deref(), Some("3/5/26"));
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let draft = fields.into_draft(today, "INR", "demo-user");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
    }
}
