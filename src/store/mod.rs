//! Document store backends.
//!
//! The store indexes donation documents by channel across every
//! organization. The only query it needs to answer is "all documents of
//! channel X", which the collector narrows down locally.

pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;

use crate::models::Channel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// A document as returned by the store: its full path and its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Slash-separated path, e.g. `donations/{org}/{year}/cash/{id}`.
    pub path: String,
    /// Document fields as plain JSON.
    #[serde(default)]
    pub data: Value,
}

impl StoredDocument {
    pub fn new(path: impl Into<String>, data: Value) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Document id: the last path segment.
    pub fn id(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
    }

    /// Id of the collection the document lives in.
    pub fn collection_id(&self) -> Option<&str> {
        let mut segments = self.path.split('/').filter(|s| !s.is_empty()).rev();
        segments.next()?;
        segments.next()
    }
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to document store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode document store response: {0}")]
    Decode(String),

    #[error("failed to read export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("query for {channel} timed out after {after:?}")]
    Timeout { channel: Channel, after: Duration },

    #[error("{0}")]
    Injected(String),
}

/// Backing store capable of a cross-organization, single-channel query.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short tag for log lines.
    fn backend_tag(&self) -> &'static str;

    /// Return every document of `channel` across all organizations.
    async fn query_channel(&self, channel: Channel) -> Result<Vec<StoredDocument>, StoreError>;
}
