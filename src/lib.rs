//! Donation statistics for NGOs.
//!
//! Collects an organization's cash, online and crypto donations for one
//! year from a document store that indexes documents by channel across
//! all organizations, then summarizes them for a dashboard: the headline
//! total, a per-method breakdown and the top donors.
//!
//! ```no_run
//! use ngo_donations::{Aggregator, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::from_export_file(std::path::Path::new("export.json"))?;
//! let report = Aggregator::new(Arc::new(store)).run(Some("ngo-uid"), "2024").await;
//! println!("total: {}", report.stats.total);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod collector;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;

pub use analysis::summarize;
pub use collector::{CollectOutcome, Collector};
pub use models::{
    BreakdownEntry, Channel, ChannelLists, Donation, DonationReport, DonationStats, TopDonor,
};
pub use pipeline::Aggregator;
pub use store::{DocumentStore, FirestoreStore, MemoryStore, StoreError, StoredDocument};
