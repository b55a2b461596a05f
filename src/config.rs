use crate::core::RateTable;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Fallback monthly budget when no preference is stored (base currency).
pub const DEFAULT_MONTHLY_BUDGET: f64 = 2000.0;
/// Fallback savings goal when no preference is stored (base currency).
pub const DEFAULT_SAVINGS_GOAL: f64 = 500.0;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    pub base: String,
    #[serde(default)]
    pub factors: HashMap<String, f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Identity of the record owner; the demo sentinel when absent.
    #[serde(default)]
    pub owner: Option<String>,
    /// Default display currency, overridable by the stored preference.
    pub currency: String,
    #[serde(default)]
    pub monthly_budget: Option<f64>,
    #[serde(default)]
    pub savings_goal: Option<f64>,
    /// Manual rate table; the built-in INR table when absent.
    #[serde(default)]
    pub rates: Option<RatesConfig>,
    /// Remote store endpoint; local-only operation when absent.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "aureus", "aureus")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "aureus", "aureus")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Builds the validated rate table, falling back to the built-in
    /// manual INR table when the config does not carry one.
    pub fn rate_table(&self) -> Result<RateTable> {
        match &self.rates {
            Some(rates) => RateTable::new(&rates.base, rates.factors.clone())
                .context("Invalid rate table in config"),
            None => Ok(RateTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEMO_OWNER;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "INR"
monthly_budget: 2500.0
rates:
  base: "INR"
  factors:
    USD: 0.0113
    EUR: 0.0098
remote:
  base_url: "https://example.supabase.co"
  api_key: "anon-key"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "INR");
        assert_eq!(config.monthly_budget, Some(2500.0));
        assert_eq!(config.savings_goal, None);
        assert!(config.owner.is_none());

        let rates = config.rates.as_ref().unwrap();
        assert_eq!(rates.base, "INR");
        assert_eq!(rates.factors.get("USD"), Some(&0.0113));

        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.base_url, "https://example.supabase.co");
        assert_eq!(remote.api_key.as_deref(), Some("anon-key"));
        assert_eq!(remote.timeout_secs, 10);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn minimal_config_uses_built_in_rates() {
        let config: AppConfig = serde_yaml::from_str("currency: \"USD\"\n").unwrap();
        assert!(config.remote.is_none());

        let rates = config.rate_table().unwrap();
        assert_eq!(rates.base(), "INR");
        assert!((rates.convert(1000.0, "INR", "USD").unwrap() - 11.3).abs() < 1e-9);
    }

    #[test]
    fn configured_rate_table_is_validated() {
        let yaml_str = r#"
currency: "INR"
rates:
  base: "INR"
  factors:
    USD: -3.0
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(config.rate_table().is_err());
    }

    #[test]
    fn owner_sentinel_is_applied_by_callers() {
        let config: AppConfig = serde_yaml::from_str("currency: \"INR\"\n").unwrap();
        let owner = config.owner.clone().unwrap_or_else(|| DEMO_OWNER.to_string());
        assert_eq!(owner, DEMO_OWNER);
    }
}
