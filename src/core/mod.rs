//! Core business logic: records, rates, aggregation.

pub mod aggregate;
pub mod error;
pub mod expense;
pub mod log;
pub mod rates;
pub mod receipt;

// Re-export main types for cleaner imports
pub use aggregate::{DashboardStats, TrendPoint};
pub use error::Error;
pub use expense::{DEMO_OWNER, Expense, ExpenseDraft};
pub use rates::RateTable;
