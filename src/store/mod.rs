//! Store seams: the remote collaborator and the durable local vault.

pub mod local;
pub mod remote;
pub mod util;

use crate::core::error::{Error, Result};
use crate::core::expense::{Expense, ExpenseDraft};
use async_trait::async_trait;

/// The remote record store the dashboard depends on. Only three calls
/// matter to this core: insert, owner-scoped query (date descending),
/// and identity retrieval.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Inserts a draft; the store assigns the canonical identifier.
    async fn insert(&self, draft: &ExpenseDraft) -> Result<Expense>;

    /// All records for `owner`, ordered by date descending.
    async fn query_all(&self, owner: &str) -> Result<Vec<Expense>>;

    /// The authenticated identity, or `None` when unauthenticated.
    async fn current_user(&self) -> Result<Option<String>>;
}

/// Stand-in used when no remote endpoint is configured: every store
/// access reports `RemoteUnavailable`, so each commit takes the local
/// fallback path and the mirror is rebuilt from the vault.
pub struct DisconnectedStore;

#[async_trait]
impl ExpenseStore for DisconnectedStore {
    async fn insert(&self, _draft: &ExpenseDraft) -> Result<Expense> {
        Err(Error::remote("insert", "no remote store configured"))
    }

    async fn query_all(&self, _owner: &str) -> Result<Vec<Expense>> {
        Err(Error::remote("query", "no remote store configured"))
    }

    async fn current_user(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
