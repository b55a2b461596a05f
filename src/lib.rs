pub mod cli;
pub mod config;
pub mod core;
pub mod export;
pub mod session;
pub mod store;

use crate::config::AppConfig;
use crate::core::rates::display_amount;
use crate::core::receipt;
use crate::core::{DEMO_OWNER, ExpenseDraft};
use crate::session::{Commit, Session};
use crate::store::local::LocalVault;
use crate::store::remote::RestStore;
use crate::store::{DisconnectedStore, ExpenseStore};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    /// Render the dashboard for today.
    Dashboard,
    /// Record a new expense.
    Add {
        title: String,
        amount: f64,
        category: String,
        date: Option<NaiveDate>,
        location: Option<String>,
        notes: Option<String>,
    },
    /// One-off conversion between two configured currencies.
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Switch the persisted display currency.
    SetCurrency { code: String },
    /// Update budget preferences (base currency).
    SetBudget {
        monthly: Option<f64>,
        goal: Option<f64>,
    },
    /// Export all records as CSV.
    Export { path: PathBuf },
    /// Parse a plain-text receipt and record the result.
    Scan { path: PathBuf },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Aureus starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rates = Arc::new(config.rate_table()?);

    // Conversion needs no stores at all.
    if let AppCommand::Convert { amount, from, to } = &command {
        let converted = rates.convert(*amount, from, to)?;
        println!(
            "{} = {}",
            display_amount(*amount, from),
            display_amount(converted, to)
        );
        return Ok(());
    }

    let data_path = config.default_data_path()?;
    let vault = Arc::new(LocalVault::open(&data_path)?);

    let remote: Arc<dyn ExpenseStore> = match &config.remote {
        Some(remote_config) => Arc::new(RestStore::new(remote_config)?),
        None => {
            warn!("No remote store configured, commits go to the local vault");
            Arc::new(DisconnectedStore)
        }
    };

    let owner = match config.owner.clone() {
        Some(owner) => owner,
        None => match remote.current_user().await {
            Ok(Some(id)) => id,
            Ok(None) => DEMO_OWNER.to_string(),
            Err(e) => {
                warn!(error = %e, "Identity lookup failed, using the demo profile");
                DEMO_OWNER.to_string()
            }
        },
    };

    let display_currency = match vault.display_currency()? {
        Some(code) => code,
        None => config.currency.clone(),
    };

    let mut session = Session::new(owner, display_currency, rates, remote, vault.clone());

    match command {
        AppCommand::Dashboard => cli::dashboard::run(&mut session).await,
        AppCommand::Add {
            title,
            amount,
            category,
            date,
            location,
            notes,
        } => {
            anyhow::ensure!(
                amount.is_finite() && amount >= 0.0,
                "Amount must be non-negative, got {amount}"
            );
            let draft = ExpenseDraft {
                title,
                amount,
                category,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                location,
                notes,
                currency: session.rates().base().to_string(),
                owner: session.owner().to_string(),
            };
            announce_commit(session.submit(draft).await?);
            Ok(())
        }
        AppCommand::Convert { .. } => unreachable!("Convert is handled before store setup"),
        AppCommand::SetCurrency { code } => {
            session.set_display_currency(&code)?;
            println!("Display currency set to {}", session.display_currency());
            Ok(())
        }
        AppCommand::SetBudget { monthly, goal } => {
            if let Some(monthly) = monthly {
                anyhow::ensure!(
                    monthly.is_finite() && monthly >= 0.0,
                    "Monthly budget must be non-negative, got {monthly}"
                );
                vault.set_monthly_budget(monthly)?;
            }
            if let Some(goal) = goal {
                anyhow::ensure!(
                    goal.is_finite() && goal >= 0.0,
                    "Savings goal must be non-negative, got {goal}"
                );
                vault.set_savings_goal(goal)?;
            }
            println!(
                "Monthly budget: {}, savings goal: {}",
                display_amount(vault.monthly_budget()?, session.rates().base()),
                display_amount(vault.savings_goal()?, session.rates().base())
            );
            Ok(())
        }
        AppCommand::Export { path } => {
            session.refresh().await?;
            export::export_to_path(session.expenses(), &path)?;
            println!(
                "Exported {} records to {}",
                session.expenses().len(),
                path.display()
            );
            Ok(())
        }
        AppCommand::Scan { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read receipt: {}", path.display()))?;
            let fields = receipt::parse_receipt_text(&text);
            println!(
                "Parsed receipt: {} / {} / {}",
                fields.merchant.as_deref().unwrap_or("?"),
                fields.amount.as_deref().unwrap_or("?"),
                fields.date.as_deref().unwrap_or("?")
            );

            let draft = fields.into_draft(
                Local::now().date_naive(),
                session.rates().base(),
                session.owner(),
            );
            announce_commit(session.submit(draft).await?);
            Ok(())
        }
    }
}

fn announce_commit(commit: Commit) {
    match commit {
        Commit::Remote(record) => {
            println!(
                "{} (id {})",
                cli::ui::style_text("Saved to remote store", cli::ui::StyleType::TotalValue),
                record.id
            );
        }
        Commit::Local(record) => {
            println!(
                "{} (id {})",
                cli::ui::style_text(
                    "Remote store unreachable: saved locally, will sync later",
                    cli::ui::StyleType::Warning
                ),
                record.id
            );
        }
    }
}
