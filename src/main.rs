//! ngo-donations - donation statistics for NGOs
//!
//! A CLI that collects an organization's donations from the document
//! store and renders the dashboard summary as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success (including an empty report when no organization is given)
//!   1 - Runtime error (bad arguments, config, unreadable export, etc.)
//!   130 - Interrupted before the report was ready

use anyhow::{bail, Context, Result};
use ngo_donations::cli::{Args, OutputFormat};
use ngo_donations::config::{Config, DEFAULT_CONFIG_FILE};
use ngo_donations::report;
use ngo_donations::store::{DocumentStore, FirestoreStore, MemoryStore};
use ngo_donations::Aggregator;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can turn on verbose output
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("ngo-donations v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ngo-donations.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set [store].project_id to your Firestore project.");
    Ok(())
}

fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging. Logs go to stderr so stdout stays clean for the report.
///
/// `RUST_LOG` directives, when set, refine the level picked by the flags.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the report and emit it. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let year = args.effective_year();
    let store = build_store(&args, &config)?;

    let aggregator = Aggregator::new(store)
        .with_fetch_timeout(Duration::from_secs(config.store.timeout_seconds));

    let shutdown = async {
        // Without a signal handler, never cancel.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let Some(donation_report) = aggregator
        .run_until(args.org.as_deref(), &year, shutdown)
        .await
    else {
        eprintln!("\n⛔ Interrupted; no report written.");
        return Ok(130);
    };

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&donation_report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&donation_report, &config.report_options())
        }
    };

    match config.general.output {
        Some(ref path) => {
            report::write_report(&output, path)?;
            eprintln!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(0)
}

/// Pick the document store: a JSON export when given, Firestore otherwise.
fn build_store(args: &Args, config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if let Some(ref export) = args.export {
        info!("Reading documents from export: {}", export.display());
        let store = MemoryStore::from_export_file(export)
            .with_context(|| format!("Failed to load export {}", export.display()))?;
        debug!("Loaded {} documents", store.len());
        return Ok(Arc::new(store));
    }

    let signed_in = args
        .org
        .as_deref()
        .map(|org| !org.trim().is_empty())
        .unwrap_or(false);
    if !signed_in {
        // Nothing will be queried.
        return Ok(Arc::new(MemoryStore::default()));
    }

    if config.store.project_id.is_empty() {
        bail!("No Firestore project configured; pass --project or set [store].project_id");
    }

    let store = FirestoreStore::new(config.firestore(args.token.clone()))
        .context("Failed to create Firestore client")?;
    Ok(Arc::new(store))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    Ok(Config::load_default()?.unwrap_or_default())
}
