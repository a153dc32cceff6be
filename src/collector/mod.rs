//! Donation collection.
//!
//! Queries every channel across all organizations, keeps only the
//! documents stored under `donations/{org}/{year}/{channel}`, and tags
//! each with the channel it came from. Store failures never reach the
//! caller: they are logged and the affected channel contributes nothing.

pub mod path;

pub use path::{path_matches, DonationPath};

use crate::models::{Channel, Donation};
use crate::store::{DocumentStore, StoreError, StoredDocument};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default upper bound on a single channel query.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a collection run, including which channels could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectOutcome {
    /// Matching donations in cash, online, crypto order.
    pub donations: Vec<Donation>,
    /// Channels whose query failed or timed out.
    pub failed_channels: Vec<Channel>,
}

impl CollectOutcome {
    /// True when at least one channel is missing from the result.
    pub fn is_degraded(&self) -> bool {
        !self.failed_channels.is_empty()
    }
}

/// Fetches and filters donations for one organization and year.
pub struct Collector {
    store: Arc<dyn DocumentStore>,
    fetch_timeout: Duration,
}

impl Collector {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Collect the donations of `org_id` for `year`.
    ///
    /// An absent or blank organization id yields an empty list.
    pub async fn collect(&self, org_id: Option<&str>, year: &str) -> Vec<Donation> {
        self.collect_detailed(org_id, year).await.donations
    }

    /// Like [`Collector::collect`], also reporting the channels that failed.
    pub async fn collect_detailed(&self, org_id: Option<&str>, year: &str) -> CollectOutcome {
        let Some(org_id) = org_id.map(str::trim).filter(|id| !id.is_empty()) else {
            warn!("No organization id; nothing to collect");
            return CollectOutcome::default();
        };

        info!(
            "Collecting {} donations for organization {} from {} store",
            year,
            org_id,
            self.store.backend_tag()
        );

        // All three queries run concurrently; join_all keeps channel order.
        let results = join_all(Channel::ALL.map(|channel| self.fetch_channel(channel))).await;

        let mut outcome = CollectOutcome::default();
        for (channel, result) in Channel::ALL.into_iter().zip(results) {
            match result {
                Ok(documents) => {
                    let fetched = documents.len();
                    let kept = select_donations(documents, org_id, year, channel);
                    debug!(
                        "{}: kept {} of {} fetched documents",
                        channel,
                        kept.len(),
                        fetched
                    );
                    outcome.donations.extend(kept);
                }
                Err(e) => {
                    warn!("Error fetching {} donations: {}", channel, e);
                    outcome.failed_channels.push(channel);
                }
            }
        }

        info!(
            "Collected {} donations ({} channel(s) failed)",
            outcome.donations.len(),
            outcome.failed_channels.len()
        );

        outcome
    }

    async fn fetch_channel(&self, channel: Channel) -> Result<Vec<StoredDocument>, StoreError> {
        match tokio::time::timeout(self.fetch_timeout, self.store.query_channel(channel)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                channel,
                after: self.fetch_timeout,
            }),
        }
    }
}

/// Keep the documents scoped to `org_id`/`year`/`channel` and turn them into
/// donations tagged with `channel`. Store order is preserved.
pub fn select_donations(
    documents: Vec<StoredDocument>,
    org_id: &str,
    year: &str,
    channel: Channel,
) -> Vec<Donation> {
    documents
        .into_iter()
        .filter(|doc| path_matches(&doc.path, org_id, year, channel))
        .map(|doc| {
            let id = doc.id().to_string();
            Donation::new(id, doc.path, channel, doc.data)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn doc(path: &str, data: serde_json::Value) -> StoredDocument {
        StoredDocument::new(path, data)
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::new(vec![
            doc("donations/ngo1/2024/cash/c1", json!({"name": "A", "amount": "100"})),
            doc("donations/ngo2/2024/cash/c2", json!({"name": "X", "amount": 999})),
            doc("donations/ngo1/2023/cash/c3", json!({"name": "Old", "amount": 5})),
            doc("donations/ngo1/2024/online/o1", json!({"name": "B", "amount": 50})),
            doc("donations/ngo1/2024/crypto/k1", json!({"name": "C", "amount": 5})),
        ])
    }

    #[test]
    fn test_select_donations_filters_and_tags() {
        let docs = vec![
            doc("donations/ngo1/2024/cash/a", json!({"paymentMethod": "Online"})),
            doc("donations/ngo10/2024/cash/b", json!({})),
        ];

        let selected = select_donations(docs, "ngo1", "2024", Channel::Cash);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), "a");
        assert_eq!(selected[0].payment_method(), Channel::Cash);
    }

    #[tokio::test]
    async fn test_collect_concatenates_channels_in_order() {
        let collector = Collector::new(Arc::new(sample_store()));

        let donations = collector.collect(Some("ngo1"), "2024").await;

        let methods: Vec<_> = donations.iter().map(|d| d.payment_method()).collect();
        assert_eq!(methods, vec![Channel::Cash, Channel::Online, Channel::Crypto]);
        assert_eq!(donations[0].donor_name(), "A");
    }

    #[tokio::test]
    async fn test_collect_without_org_is_empty() {
        let store = Arc::new(sample_store());
        let collector = Collector::new(store.clone());

        assert!(collector.collect(None, "2024").await.is_empty());
        assert!(collector.collect(Some("  "), "2024").await.is_empty());
        assert_eq!(store.query_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_channel_keeps_others() {
        let collector = Collector::new(Arc::new(sample_store().with_failure(Channel::Online)));

        let outcome = collector.collect_detailed(Some("ngo1"), "2024").await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.failed_channels, vec![Channel::Online]);
        let methods: Vec<_> = outcome.donations.iter().map(|d| d.payment_method()).collect();
        assert_eq!(methods, vec![Channel::Cash, Channel::Crypto]);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = sample_store().with_delay(Duration::from_millis(500));
        let collector =
            Collector::new(Arc::new(store)).with_fetch_timeout(Duration::from_millis(20));

        let outcome = collector.collect_detailed(Some("ngo1"), "2024").await;

        assert!(outcome.donations.is_empty());
        assert_eq!(outcome.failed_channels, Channel::ALL.to_vec());
    }
}
