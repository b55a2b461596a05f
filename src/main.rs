use anyhow::Result;
use aureus::core::log::init_logging;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for aureus::AppCommand {
    fn from(cmd: Commands) -> aureus::AppCommand {
        match cmd {
            Commands::Dashboard => aureus::AppCommand::Dashboard,
            Commands::Add {
                title,
                amount,
                category,
                date,
                location,
                notes,
            } => aureus::AppCommand::Add {
                title,
                amount,
                category,
                date,
                location,
                notes,
            },
            Commands::Convert { amount, from, to } => {
                aureus::AppCommand::Convert { amount, from, to }
            }
            Commands::Currency { code } => aureus::AppCommand::SetCurrency { code },
            Commands::Budget { monthly, goal } => aureus::AppCommand::SetBudget { monthly, goal },
            Commands::Export { path } => aureus::AppCommand::Export { path },
            Commands::Scan { path } => aureus::AppCommand::Scan { path },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the spending dashboard
    Dashboard,
    /// Record a new expense
    Add {
        /// Short description
        title: String,
        /// Amount in the base currency
        amount: f64,
        /// Category label (free-form)
        #[arg(short = 'C', long, default_value = "Other")]
        category: String,
        /// Date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Where the expense happened
        #[arg(short, long)]
        location: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Convert an amount between configured currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Set the display currency
    Currency { code: String },
    /// Set budget preferences (base currency)
    Budget {
        #[arg(short, long)]
        monthly: Option<f64>,
        #[arg(short, long)]
        goal: Option<f64>,
    },
    /// Export all records as CSV
    Export { path: PathBuf },
    /// Record an expense from a plain-text receipt
    Scan { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => aureus::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = aureus::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
currency: "INR"

# owner: "your-user-id"

# remote:
#   base_url: "https://your-project.supabase.co"
#   api_key: "anon-key"

# rates:
#   base: "INR"
#   factors:
#     USD: 0.0113
#     EUR: 0.0098
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
