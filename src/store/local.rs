//! Durable local vault for fallback commits and user preferences.
//!
//! A single fjall partition holding string values: the expense snapshot
//! list (JSON) plus the display-currency, monthly-budget, and
//! savings-goal preferences. Snapshot updates are read-modify-write of
//! the whole list, so they are serialized behind a mutex; two rapid
//! fallback commits can no longer overwrite each other.

use crate::config::{DEFAULT_MONTHLY_BUDGET, DEFAULT_SAVINGS_GOAL};
use crate::core::error::{Error, Result};
use crate::core::expense::{Expense, ExpenseDraft};
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const KEY_EXPENSES: &str = "expenses";
const KEY_CURRENCY: &str = "currency";
const KEY_MONTHLY_BUDGET: &str = "monthly_budget";
const KEY_SAVINGS_GOAL: &str = "savings_goal";

pub struct LocalVault {
    keyspace: Keyspace,
    partition: PartitionHandle,
    snapshot_lock: Mutex<()>,
}

impl LocalVault {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| Error::local("create vault dir", e))?;

        let keyspace = fjall::Config::new(path.join("vault"))
            .open()
            .map_err(|e| Error::local("open vault", e))?;
        let partition = keyspace
            .open_partition("aureus", PartitionCreateOptions::default())
            .map_err(|e| Error::local("open vault partition", e))?;

        Ok(LocalVault {
            keyspace,
            partition,
            snapshot_lock: Mutex::new(()),
        })
    }

    fn read_string(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .partition
            .get(key)
            .map_err(|e| Error::local("read vault", e))?;
        match value {
            Some(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => Ok(Some(text.to_string())),
                Err(_) => {
                    warn!(key, "Discarding non-UTF8 vault value");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn write_string(&self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key, value)
            .map_err(|e| Error::local("write vault", e))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| Error::local("persist vault", e))?;
        debug!(key, "Vault write persisted");
        Ok(())
    }

    /// The durable local list. Every record in it was committed by the
    /// fallback path and awaits reconciliation. A corrupt snapshot is
    /// treated as absent, with a warning.
    pub fn expenses(&self) -> Result<Vec<Expense>> {
        let Some(raw) = self.read_string(KEY_EXPENSES)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(error = %e, "Corrupt expense snapshot in vault, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Commits a draft locally: synthesizes an identifier, appends to
    /// the snapshot, and returns the committed record. Serialized so
    /// concurrent commits cannot lose each other's writes.
    pub async fn append_expense(&self, draft: ExpenseDraft) -> Result<Expense> {
        let _guard = self.snapshot_lock.lock().await;

        let mut list = self.expenses()?;
        let record = draft.into_local(Utc::now().timestamp_millis(), list.len());
        debug!(id = %record.id, "Committing expense locally");
        list.push(record.clone());

        let raw =
            serde_json::to_string(&list).map_err(|e| Error::local("serialize snapshot", e))?;
        self.write_string(KEY_EXPENSES, &raw)?;
        Ok(record)
    }

    /// Drops a reconciled record from the snapshot.
    pub async fn remove_expense(&self, id: &str) -> Result<()> {
        let _guard = self.snapshot_lock.lock().await;

        let mut list = self.expenses()?;
        list.retain(|e| e.id != id);
        let raw =
            serde_json::to_string(&list).map_err(|e| Error::local("serialize snapshot", e))?;
        self.write_string(KEY_EXPENSES, &raw)
    }

    /// Stored display-currency preference, if a plausible code is
    /// present.
    pub fn display_currency(&self) -> Result<Option<String>> {
        let Some(raw) = self.read_string(KEY_CURRENCY)? else {
            return Ok(None);
        };
        let code = raw.trim().to_uppercase();
        if !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Some(code))
        } else {
            warn!(raw, "Ignoring malformed currency preference");
            Ok(None)
        }
    }

    pub fn set_display_currency(&self, code: &str) -> Result<()> {
        self.write_string(KEY_CURRENCY, &code.trim().to_uppercase())
    }

    /// Monthly budget preference in base currency. Malformed or
    /// negative values fall back to the documented default rather than
    /// propagating.
    pub fn monthly_budget(&self) -> Result<f64> {
        self.numeric_pref(KEY_MONTHLY_BUDGET, DEFAULT_MONTHLY_BUDGET)
    }

    pub fn set_monthly_budget(&self, value: f64) -> Result<()> {
        self.write_string(KEY_MONTHLY_BUDGET, &value.to_string())
    }

    /// Savings goal preference in base currency, same fallback rules.
    pub fn savings_goal(&self) -> Result<f64> {
        self.numeric_pref(KEY_SAVINGS_GOAL, DEFAULT_SAVINGS_GOAL)
    }

    pub fn set_savings_goal(&self, value: f64) -> Result<()> {
        self.write_string(KEY_SAVINGS_GOAL, &value.to_string())
    }

    fn numeric_pref(&self, key: &str, default: f64) -> Result<f64> {
        let Some(raw) = self.read_string(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => {
                warn!(key, raw, "Ignoring malformed numeric preference");
                Ok(default)
            }
        }
    }
}
