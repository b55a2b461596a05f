//! CSV export of the expense set.

use crate::core::expense::Expense;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const HEADERS: [&str; 6] = ["Date", "Title", "Amount", "Category", "Location", "Notes"];

/// Writes the records as CSV. Amounts are emitted with two fraction
/// digits in the base currency; optional fields render as empty cells.
pub fn write_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADERS)
        .context("Failed to write CSV header")?;

    for expense in expenses {
        csv.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.title.clone(),
            format!("{:.2}", expense.amount),
            expense.category.clone(),
            expense.location.clone().unwrap_or_default(),
            expense.notes.clone().unwrap_or_default(),
        ])
        .with_context(|| format!("Failed to write CSV row for expense {}", expense.id))?;
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_to_path(expenses: &[Expense], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_csv(expenses, file)
}
