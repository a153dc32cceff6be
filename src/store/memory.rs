//! In-memory document store.
//!
//! Backs offline runs from a JSON export and the test suite. A document
//! belongs to the channel named by its parent collection id.

use super::{DocumentStore, StoreError, StoredDocument};
use crate::models::Channel;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Accepted export layouts: `{"documents": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Wrapped { documents: Vec<StoredDocument> },
    Bare(Vec<StoredDocument>),
}

#[derive(Default)]
pub struct MemoryStore {
    documents: Vec<StoredDocument>,
    failing: HashSet<Channel>,
    delay: Duration,
    query_calls: AtomicU64,
}

impl MemoryStore {
    pub fn new(documents: Vec<StoredDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Load documents from a JSON export file.
    pub fn from_export_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_export_json(&content)
    }

    pub fn from_export_json(content: &str) -> Result<Self, StoreError> {
        let export: ExportFile =
            serde_json::from_str(content).map_err(|e| StoreError::Decode(e.to_string()))?;
        let documents = match export {
            ExportFile::Wrapped { documents } => documents,
            ExportFile::Bare(documents) => documents,
        };
        Ok(Self::new(documents))
    }

    /// Make queries for `channel` fail.
    pub fn with_failure(mut self, channel: Channel) -> Self {
        self.failing.insert(channel);
        self
    }

    /// Delay every query by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of channel queries answered or attempted so far.
    pub fn query_calls(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn query_channel(&self, channel: Channel) -> Result<Vec<StoredDocument>, StoreError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(&channel) {
            return Err(StoreError::Injected(format!(
                "permission denied for collection group '{}'",
                channel.collection_id()
            )));
        }

        Ok(self
            .documents
            .iter()
            .filter(|doc| {
                doc.collection_id().and_then(Channel::from_collection_id) == Some(channel)
            })
            .cloned()
            .collect())
    }
}
