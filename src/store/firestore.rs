//! Firestore REST backend.
//!
//! Issues one collection-group query per channel (`allDescendants: true`),
//! which returns matching documents from every organization, and decodes
//! Firestore's typed field values into plain JSON.

use super::{DocumentStore, StoreError, StoredDocument};
use crate::models::Channel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    /// ID token of the signed-in user, sent as a bearer token.
    pub id_token: Option<String>,
    /// HTTP-level timeout for a single query.
    pub timeout_seconds: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com".to_string(),
            project_id: String::new(),
            database: "(default)".to_string(),
            id_token: None,
            timeout_seconds: 30,
        }
    }
}

impl FirestoreConfig {
    /// URL of the `runQuery` endpoint at the database root.
    pub fn run_query_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents:runQuery",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest {
    structured_query: Value,
}

#[derive(Debug, Deserialize)]
struct RunQueryResponseItem {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// Firestore-backed document store.
pub struct FirestoreStore {
    config: FirestoreConfig,
    http_client: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn collection_group_query(channel: Channel) -> RunQueryRequest {
        RunQueryRequest {
            structured_query: json!({
                "from": [{
                    "collectionId": channel.collection_id(),
                    "allDescendants": true
                }]
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend_tag(&self) -> &'static str {
        "firestore"
    }

    async fn query_channel(&self, channel: Channel) -> Result<Vec<StoredDocument>, StoreError> {
        let url = self.config.run_query_url();
        debug!("Querying collection group '{}' at {}", channel.collection_id(), url);

        let mut request = self
            .http_client
            .post(&url)
            .json(&Self::collection_group_query(channel));
        if let Some(ref token) = self.config.id_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let items: Vec<RunQueryResponseItem> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(into_stored_document)
            .collect())
    }
}

fn into_stored_document(doc: FirestoreDocument) -> StoredDocument {
    let data = doc
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect::<Map<String, Value>>();

    StoredDocument::new(relative_path(&doc.name), Value::Object(data))
}

/// Strip the `projects/{p}/databases/{d}/documents/` prefix from a resource name.
pub fn relative_path(name: &str) -> &str {
    match name.find("/documents/") {
        Some(idx) => &name[idx + "/documents/".len()..],
        None => name,
    }
}

/// Convert one Firestore typed value (`{"stringValue": "x"}`) into plain JSON.
pub fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = map.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "booleanValue" => inner.clone(),
        "nullValue" => Value::Null,
        "geoPointValue" => inner.clone(),
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), decode_value(v)))
                        .collect::<Map<String, Value>>()
                })
                .unwrap_or_default();
            Value::Object(fields)
        }
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default();
            Value::Array(values)
        }
        _ => Value::Null,
    }
}
