//! Data models for donation reporting.
//!
//! This module contains the core data structures used throughout the
//! crate: the intake channels, the normalized donation record, and the
//! statistics produced for the dashboard.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Donation intake channel. Each channel lives in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Cash handed over in person
    Cash,
    /// UPI / online transfers
    Online,
    /// Token transfers; amounts are token counts, not currency
    Crypto,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payment_method())
    }
}

impl Channel {
    /// Every channel, in collection order.
    pub const ALL: [Channel; 3] = [Channel::Cash, Channel::Online, Channel::Crypto];

    /// Name of the collection holding this channel's documents.
    pub fn collection_id(&self) -> &'static str {
        match self {
            Channel::Cash => "cash",
            Channel::Online => "online",
            Channel::Crypto => "crypto",
        }
    }

    /// Payment method label shown to users.
    pub fn payment_method(&self) -> &'static str {
        match self {
            Channel::Cash => "Cash",
            Channel::Online => "Online",
            Channel::Crypto => "Crypto",
        }
    }

    /// Whether amounts in this channel are token counts rather than money.
    pub fn is_crypto(&self) -> bool {
        matches!(self, Channel::Crypto)
    }

    /// Resolve a collection id (`cash`, `online`, `crypto`) to a channel.
    pub fn from_collection_id(id: &str) -> Option<Self> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.collection_id() == id)
    }
}

/// Raw document body as stored. Every field is optional and loosely typed;
/// unknown fields (including any stored `paymentMethod`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonationBody {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    donor_name: Option<Value>,
    #[serde(default)]
    amount: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    donated_on: Option<Value>,
}

/// A single donation, read-only for the duration of an aggregation run.
///
/// The payment method is fixed by the channel the document was fetched
/// from and cannot be changed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    id: String,
    path: String,
    payment_method: Channel,
    body: DonationBody,
}

impl Donation {
    /// Build a donation from a stored document body.
    ///
    /// A body that is not a JSON object yields a donation with every field
    /// defaulted.
    pub fn new(id: impl Into<String>, path: impl Into<String>, channel: Channel, data: Value) -> Self {
        let body: DonationBody = serde_json::from_value(data).unwrap_or_default();
        Self {
            id: id.into(),
            path: path.into(),
            payment_method: channel,
            body,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn payment_method(&self) -> Channel {
        self.payment_method
    }

    /// Donor display name: `name`, falling back to `donorName`.
    pub fn donor_name(&self) -> &str {
        [&self.body.name, &self.body.donor_name]
            .into_iter()
            .filter_map(|v| v.as_ref().and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Numeric amount; missing or unparseable values count as zero.
    pub fn amount(&self) -> f64 {
        coerce_amount(self.body.amount.as_ref())
    }

    /// Donation date: `timestamp`, falling back to `donatedOn`.
    pub fn date(&self) -> Option<String> {
        [&self.body.timestamp, &self.body.donated_on]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(date_text))
    }

    /// Date for table display. Online and crypto ids have historically been
    /// creation timestamps, so the id is tried when no date field is set.
    pub fn display_date(&self) -> String {
        if let Some(date) = self.date() {
            return date;
        }

        timestamp_from_id(&self.id)
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "No date".to_string())
    }
}

/// Coerce a loosely typed amount into a finite number, defaulting to zero.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn date_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::<Utc>::from_timestamp(seconds, nanos as u32)
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        _ => None,
    }
}

fn timestamp_from_id(id: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = id.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(millis);
    }
    DateTime::parse_from_rfc3339(id)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Per-channel amount total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub method: Channel,
    pub amount: f64,
}

/// One of the highest individual donations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDonor {
    pub name: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Summary statistics for one organization and year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    /// Sum of all non-crypto amounts.
    pub total: f64,
    /// Per-channel sums in first-seen order, crypto included.
    pub breakdown: Vec<BreakdownEntry>,
    /// Up to three largest non-crypto donations.
    pub top_donors: Vec<TopDonor>,
}

/// Collected donations split by the channel they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelLists {
    pub cash: Vec<Donation>,
    pub online: Vec<Donation>,
    pub crypto: Vec<Donation>,
}

impl ChannelLists {
    pub fn get(&self, channel: Channel) -> &[Donation] {
        match channel {
            Channel::Cash => &self.cash,
            Channel::Online => &self.online,
            Channel::Crypto => &self.crypto,
        }
    }
}

/// Everything the dashboard renders for one organization and year.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationReport {
    /// Organization the report is scoped to; `None` when nobody is signed in.
    pub org_id: Option<String>,
    pub year: String,
    pub generated_at: DateTime<Utc>,
    pub stats: DonationStats,
    pub channels: ChannelLists,
    /// Channels that could not be read; their data is missing from the report.
    pub failed_channels: Vec<Channel>,
}

impl DonationReport {
    /// True when some channel failed and the figures are incomplete.
    pub fn is_degraded(&self) -> bool {
        !self.failed_channels.is_empty()
    }

    /// Number of donations across all channels.
    pub fn donation_count(&self) -> usize {
        Channel::ALL
            .iter()
            .map(|channel| self.channels.get(*channel).len())
            .sum()
    }
}
