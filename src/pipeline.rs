//! The aggregation pipeline: collect, then summarize.

use crate::analysis::{split_by_channel, summarize};
use crate::collector::Collector;
use crate::models::DonationReport;
use crate::store::DocumentStore;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs the collector and summarizer once per call.
pub struct Aggregator {
    collector: Collector,
}

impl Aggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collector: Collector::new(store),
        }
    }

    /// Bound each channel query by `timeout`.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.collector = self.collector.with_fetch_timeout(timeout);
        self
    }

    /// Build the report for `org_id` and `year`.
    ///
    /// Never fails: a missing or blank organization id produces an empty
    /// report and store failures produce a degraded one.
    pub async fn run(&self, org_id: Option<&str>, year: &str) -> DonationReport {
        let org_id = org_id.map(str::trim).filter(|id| !id.is_empty());
        let outcome = self.collector.collect_detailed(org_id, year).await;

        // Summarizing needs the complete set, so it only starts here.
        let stats = summarize(&outcome.donations);
        debug!("Donation stats: {:?}", stats);

        if outcome.is_degraded() {
            warn!(
                "Report is incomplete; failed channels: {:?}",
                outcome.failed_channels
            );
        }

        info!(
            "Total donations (excluding crypto): {} across {} record(s)",
            stats.total,
            outcome.donations.len()
        );

        DonationReport {
            org_id: org_id.map(str::to_string),
            year: year.to_string(),
            generated_at: Utc::now(),
            stats,
            channels: split_by_channel(&outcome.donations),
            failed_channels: outcome.failed_channels,
        }
    }

    /// Like [`Aggregator::run`], but abandoned when `shutdown` completes first.
    ///
    /// In-flight store queries are dropped and `None` is returned.
    pub async fn run_until<F>(
        &self,
        org_id: Option<&str>,
        year: &str,
        shutdown: F,
    ) -> Option<DonationReport>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            report = self.run(org_id, year) => Some(report),
            _ = shutdown => {
                info!("Aggregation cancelled");
                None
            }
        }
    }
}
