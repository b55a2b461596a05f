//! Dashboard aggregation over the in-memory expense set.
//!
//! All arithmetic happens in the base currency; every figure in the
//! resulting [`DashboardStats`] has already been converted to the
//! display currency. The caller supplies `today` so calendar windows
//! are explicit and testable.

use crate::core::error::Result;
use crate::core::expense::Expense;
use crate::core::rates::RateTable;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

/// Number of points in the daily trend, covering `[today - 6, today]`.
pub const TREND_DAYS: usize = 7;

/// Bucket used for blank category labels. Anything non-blank is its
/// own bucket; the category set is open.
pub const FALLBACK_CATEGORY: &str = "Other";

/// One day of the trailing spending trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday name ("Mon", "Tue", ...), chart label.
    pub weekday: String,
    pub total: f64,
}

/// Aggregates consumed by the dashboard and its charting collaborator.
/// Monetary values are in the display currency.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub display_currency: String,
    pub total_all_time: f64,
    pub total_this_month: f64,
    pub monthly_budget: f64,
    pub remaining_budget: f64,
    pub savings_goal: f64,
    pub transaction_count_this_month: usize,
    pub average_transaction: f64,
    /// Descending by total, ties broken by label. Deterministic so the
    /// chart's color assignment is stable between refreshes.
    pub category_totals: Vec<(String, f64)>,
    /// Oldest first, exactly [`TREND_DAYS`] points, zero-filled.
    pub daily_trend: Vec<TrendPoint>,
}

/// Computes dashboard statistics. Budget and goal are base-currency
/// preference values. An empty record set yields all-zero aggregates;
/// an unknown display currency is the only failure mode.
pub fn compute(
    expenses: &[Expense],
    today: NaiveDate,
    monthly_budget: f64,
    savings_goal: f64,
    rates: &RateTable,
    display_currency: &str,
) -> Result<DashboardStats> {
    let mut total_all_time = 0.0;
    let mut total_this_month = 0.0;
    let mut month_count = 0usize;
    let mut categories: HashMap<String, f64> = HashMap::new();

    let trend_start = today
        .checked_sub_days(Days::new(TREND_DAYS as u64 - 1))
        .unwrap_or(today);
    let mut daily: HashMap<NaiveDate, f64> = HashMap::new();

    for expense in expenses {
        total_all_time += expense.amount;

        if expense.date.year() == today.year() && expense.date.month() == today.month() {
            total_this_month += expense.amount;
            month_count += 1;
        }

        let label = expense.category.trim();
        let label = if label.is_empty() {
            FALLBACK_CATEGORY
        } else {
            label
        };
        *categories.entry(label.to_string()).or_insert(0.0) += expense.amount;

        if expense.date >= trend_start && expense.date <= today {
            *daily.entry(expense.date).or_insert(0.0) += expense.amount;
        }
    }

    // Division guarded so an empty month renders as 0, never NaN.
    let average_transaction = if month_count == 0 {
        0.0
    } else {
        total_this_month / month_count as f64
    };

    let mut category_totals: Vec<(String, f64)> = categories.into_iter().collect();
    category_totals.sort_by(|(label_a, total_a), (label_b, total_b)| {
        total_b
            .total_cmp(total_a)
            .then_with(|| label_a.cmp(label_b))
    });
    for (_, total) in &mut category_totals {
        *total = rates.to_display(*total, display_currency)?;
    }

    let mut daily_trend = Vec::with_capacity(TREND_DAYS);
    for offset in 0..TREND_DAYS {
        let date = trend_start
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(today);
        let total = daily.get(&date).copied().unwrap_or(0.0);
        daily_trend.push(TrendPoint {
            date,
            weekday: date.format("%a").to_string(),
            total: rates.to_display(total, display_currency)?,
        });
    }

    let remaining_budget = monthly_budget - total_this_month;

    Ok(DashboardStats {
        display_currency: display_currency.trim().to_uppercase(),
        total_all_time: rates.to_display(total_all_time, display_currency)?,
        total_this_month: rates.to_display(total_this_month, display_currency)?,
        monthly_budget: rates.to_display(monthly_budget, display_currency)?,
        remaining_budget: rates.to_display(remaining_budget, display_currency)?,
        savings_goal: rates.to_display(savings_goal, display_currency)?,
        transaction_count_this_month: month_count,
        average_transaction: rates.to_display(average_transaction, display_currency)?,
        category_totals,
        daily_trend,
    })
}
