//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::Datelike;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ngo-donations - donation statistics for NGOs
///
/// Fetches cash, online and crypto donations for one organization and
/// year from the document store and renders the dashboard summary:
/// headline total, per-method breakdown, top donors and per-channel tables.
///
/// Examples:
///   ngo-donations --org <UID> --project ngo-connect --token <ID_TOKEN>
///   ngo-donations --org <UID> --year 2024 --format json --output stats.json
///   ngo-donations --org <UID> --export fixtures/donations.json
///   ngo-donations --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Organization (NGO) id of the signed-in user
    ///
    /// When absent the report is empty: nothing is fetched.
    #[arg(long, value_name = "ID", env = "NGO_ORG_ID")]
    pub org: Option<String>,

    /// Year to report on (defaults to the current year)
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<String>,

    /// Firestore project id
    #[arg(short, long, value_name = "PROJECT", env = "FIRESTORE_PROJECT_ID")]
    pub project: Option<String>,

    /// Firestore REST base URL (e.g. an emulator at http://localhost:8080)
    #[arg(long, value_name = "URL", env = "FIRESTORE_BASE_URL")]
    pub base_url: Option<String>,

    /// ID token of the signed-in user, sent as a bearer token
    #[arg(long, value_name = "TOKEN", env = "FIRESTORE_ID_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read documents from a JSON export instead of the live store
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Per-channel query timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Rows shown in each per-channel table
    #[arg(long, value_name = "COUNT")]
    pub rows: Option<usize>,

    /// Currency glyph for non-crypto amounts
    #[arg(long, value_name = "SYMBOL")]
    pub currency: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ngo-donations.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .ngo-donations.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested year, or the current one.
    pub fn effective_year(&self) -> String {
        self.year
            .clone()
            .unwrap_or_else(|| chrono::Local::now().year().to_string())
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref year) = self.year {
            if year.is_empty() || year.contains('/') {
                return Err(format!("Invalid year: '{}'", year));
            }
        }

        if let Some(ref org) = self.org {
            if org.contains('/') {
                return Err("Organization id must not contain '/'".to_string());
            }
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.rows == Some(0) {
            return Err("Rows must be at least 1".to_string());
        }

        if let Some(ref export) = self.export {
            if !export.is_file() {
                return Err(format!("Export file does not exist: {}", export.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
