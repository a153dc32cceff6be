//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ngo-donations.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::report::ReportOptions;
use crate::store::FirestoreConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".ngo-donations.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Write the report here instead of stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Firestore REST API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Firestore project id.
    #[serde(default)]
    pub project_id: String,

    /// Firestore database id.
    #[serde(default = "default_database")]
    pub database: String,

    /// Per-channel query timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: String::new(),
            database: default_database(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Glyph shown before currency amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Rows shown per channel table.
    #[serde(default = "default_table_rows")]
    pub table_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            table_rows: default_table_rows(),
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_table_rows() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load the default config file from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref project) = args.project {
            self.store.project_id = project.clone();
        }
        if let Some(ref base_url) = args.base_url {
            self.store.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.store.timeout_seconds = timeout;
        }

        if let Some(rows) = args.rows {
            self.report.table_rows = rows;
        }
        if let Some(ref symbol) = args.currency {
            self.report.currency_symbol = symbol.clone();
        }
    }

    /// Firestore connection settings, with the caller's ID token.
    pub fn firestore(&self, id_token: Option<String>) -> FirestoreConfig {
        FirestoreConfig {
            base_url: self.store.base_url.clone(),
            project_id: self.store.project_id.clone(),
            database: self.store.database.clone(),
            id_token,
            timeout_seconds: self.store.timeout_seconds,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            currency_symbol: self.report.currency_symbol.clone(),
            table_rows: self.report.table_rows,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
