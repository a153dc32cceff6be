//! Storage path matching.
//!
//! Donations are scoped positionally: `donations/{org}/{year}/{channel}/{id}`.
//! Matching compares whole segments so that one organization id being a
//! substring of another never selects the wrong tenant.

use crate::models::Channel;

/// A storage path split into its non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> DonationPath<'a> {
    pub fn parse(path: &'a str) -> Self {
        Self {
            segments: path.split('/').filter(|s| !s.is_empty()).collect(),
        }
    }

    /// True when the path contains the consecutive segments
    /// `donations`, `org_id`, `year`, `channel`.
    pub fn matches(&self, org_id: &str, year: &str, channel: Channel) -> bool {
        let expected = ["donations", org_id, year, channel.collection_id()];
        self.segments.windows(expected.len()).any(|w| w == expected)
    }
}

/// Convenience wrapper around [`DonationPath::matches`].
pub fn path_matches(path: &str, org_id: &str, year: &str, channel: Channel) -> bool {
    DonationPath::parse(path).matches(org_id, year, channel)
}
