//! Session controller: owns the rate table, the store handles, and the
//! in-memory mirror of the expense set.
//!
//! The mirror is the cached, possibly-stale view of the remote store.
//! It is replaced wholesale after every successful remote query and
//! rebuilt from the local vault whenever the remote is unreachable.
//! Nothing here is ambient state; the session is constructed from
//! configuration and passed explicitly.

use crate::core::aggregate::{self, DashboardStats};
use crate::core::error::Result;
use crate::core::expense::{Expense, ExpenseDraft};
use crate::core::rates::RateTable;
use crate::store::ExpenseStore;
use crate::store::local::LocalVault;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which path a submitted expense ended up on. The caller must be able
/// to tell the user which one, so the record is carried along.
#[derive(Debug, Clone)]
pub enum Commit {
    /// Acknowledged by the remote store; the mirror was re-fetched.
    Remote(Expense),
    /// Remote write failed; durably recorded in the local vault.
    Local(Expense),
}

/// Where the mirror currently comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    LocalOnly,
}

pub struct Session {
    owner: String,
    display_currency: String,
    rates: Arc<RateTable>,
    remote: Arc<dyn ExpenseStore>,
    vault: Arc<LocalVault>,
    expenses: Vec<Expense>,
}

impl Session {
    pub fn new(
        owner: String,
        display_currency: String,
        rates: Arc<RateTable>,
        remote: Arc<dyn ExpenseStore>,
        vault: Arc<LocalVault>,
    ) -> Self {
        Session {
            owner,
            display_currency: display_currency.trim().to_uppercase(),
            rates,
            remote,
            vault,
            expenses: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn display_currency(&self) -> &str {
        &self.display_currency
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Reloads the mirror. A successful remote query proves
    /// connectivity, so pending local commits are replayed first and
    /// the final set is fetched afterwards. On remote failure the
    /// mirror is exactly the vault list.
    pub async fn refresh(&mut self) -> Result<DataSource> {
        match self.remote.query_all(&self.owner).await {
            Ok(records) => {
                self.expenses = records;
                if self.reconcile().await > 0 {
                    // Pick up the ids the remote assigned during replay.
                    match self.remote.query_all(&self.owner).await {
                        Ok(records) => self.expenses = records,
                        Err(e) => {
                            warn!(error = %e, "Re-query after reconciliation failed");
                        }
                    }
                }
                Ok(DataSource::Remote)
            }
            Err(e) => {
                warn!(error = %e, "Remote query failed, serving local snapshot");
                self.expenses = self.vault.expenses()?;
                Ok(DataSource::LocalOnly)
            }
        }
    }

    /// Submits a new expense. Remote first; on any remote failure the
    /// record is committed to the vault instead and the mirror is set
    /// to exactly the local list. The outcome always says which path
    /// committed.
    pub async fn submit(&mut self, draft: ExpenseDraft) -> Result<Commit> {
        match self.remote.insert(&draft).await {
            Ok(record) => {
                info!(id = %record.id, "Expense saved remotely");
                match self.remote.query_all(&self.owner).await {
                    Ok(records) => self.expenses = records,
                    Err(e) => {
                        // The insert is committed; keep the stale
                        // mirror rather than faking a fallback.
                        warn!(error = %e, "Refresh after insert failed, keeping previous mirror");
                    }
                }
                Ok(Commit::Remote(record))
            }
            Err(e) => {
                warn!(error = %e, "Remote insert failed, committing to local vault");
                let record = self.vault.append_expense(draft).await?;
                self.expenses = self.vault.expenses()?;
                Ok(Commit::Local(record))
            }
        }
    }

    /// Replays pending local commits oldest-first. Each acknowledged
    /// insert removes the record from the vault; the first failure
    /// stops the pass and leaves the rest queued. Returns how many
    /// records were replayed.
    async fn reconcile(&self) -> usize {
        let pending = match self.vault.expenses() {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Could not read vault for reconciliation");
                return 0;
            }
        };
        if pending.is_empty() {
            return 0;
        }

        info!(count = pending.len(), "Reconciling local commits with remote store");
        let mut replayed = 0;
        for record in pending {
            match self.remote.insert(&record.to_draft()).await {
                Ok(assigned) => {
                    debug!(local = %record.id, remote = %assigned.id, "Reconciled local commit");
                    if let Err(e) = self.vault.remove_expense(&record.id).await {
                        warn!(error = %e, "Replayed record could not be dequeued");
                        break;
                    }
                    replayed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Reconciliation stopped, remaining records stay queued");
                    break;
                }
            }
        }
        replayed
    }

    /// Computes dashboard statistics for `today` in the session's
    /// display currency, using the stored budget/goal preferences.
    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats> {
        let monthly_budget = self.vault.monthly_budget()?;
        let savings_goal = self.vault.savings_goal()?;
        aggregate::compute(
            &self.expenses,
            today,
            monthly_budget,
            savings_goal,
            &self.rates,
            &self.display_currency,
        )
    }

    /// Switches the display currency; the code must be configured in
    /// the rate table. The preference is persisted.
    pub fn set_display_currency(&mut self, code: &str) -> Result<()> {
        let code = code.trim().to_uppercase();
        // Probe the table; conversion at render time must not fail.
        self.rates.convert(1.0, self.rates.base(), &code)?;
        self.vault.set_display_currency(&code)?;
        self.display_currency = code;
        Ok(())
    }
}
