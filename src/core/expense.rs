//! Expense record model.
//!
//! Amounts are always denominated in the base currency of the rate
//! table; the `currency` field only records the display currency that
//! was selected when the expense was created.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Owner identifier used when no authenticated user is present.
pub const DEMO_OWNER: &str = "demo-user";

/// A committed expense record, either remote-assigned or locally
/// synthesized (`local-` prefixed id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub currency: String,
    #[serde(rename = "user_id")]
    pub owner: String,
}

/// A new expense before any store has assigned it an identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub currency: String,
    #[serde(rename = "user_id")]
    pub owner: String,
}

impl ExpenseDraft {
    /// Commits the draft locally with a synthesized identifier. `seq`
    /// disambiguates drafts created within the same millisecond; vault
    /// writes are serialized, so the sequence number is stable.
    pub fn into_local(self, millis: i64, seq: usize) -> Expense {
        Expense {
            id: format!("local-{millis}-{seq}"),
            title: self.title,
            amount: self.amount,
            category: self.category,
            date: self.date,
            location: self.location,
            notes: self.notes,
            currency: self.currency,
            owner: self.owner,
        }
    }
}

impl Expense {
    /// Whether this record was committed by the local fallback path and
    /// still awaits reconciliation with the remote store.
    pub fn is_local(&self) -> bool {
        self.id.starts_with("local-")
    }

    /// Strips the identifier back off for a reconciliation replay; the
    /// remote store assigns the canonical id.
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            title: self.title.clone(),
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
            location: self.location.clone(),
            notes: self.notes.clone(),
            currency: self.currency.clone(),
            owner: self.owner.clone(),
        }
    }
}
