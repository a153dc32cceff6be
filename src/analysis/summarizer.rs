//! Donation aggregation and statistics.
//!
//! This module turns the collected donations into the summary the
//! dashboard shows. Crypto amounts are token counts: they are left out of
//! the headline total and the top donors, but still appear in the
//! per-channel breakdown.

use crate::models::{BreakdownEntry, Channel, ChannelLists, Donation, DonationStats, TopDonor};
use serde::{Deserialize, Serialize};

/// Number of entries in the top donors list.
pub const TOP_DONOR_COUNT: usize = 3;

/// Colours assigned to chart slices, cycled by index.
pub const CHART_COLORS: [&str; 4] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042"];

/// Compute the full statistics for a collected donation set.
pub fn summarize(donations: &[Donation]) -> DonationStats {
    DonationStats {
        total: total_excluding_crypto(donations),
        breakdown: breakdown_by_method(donations),
        top_donors: top_donors(donations, TOP_DONOR_COUNT),
    }
}

/// Sum of all non-crypto amounts.
pub fn total_excluding_crypto(donations: &[Donation]) -> f64 {
    donations
        .iter()
        .filter(|d| !d.payment_method().is_crypto())
        .map(Donation::amount)
        .sum()
}

/// Sum amounts per payment method, in order of first appearance.
pub fn breakdown_by_method(donations: &[Donation]) -> Vec<BreakdownEntry> {
    let mut breakdown: Vec<BreakdownEntry> = Vec::new();

    for donation in donations {
        let method = donation.payment_method();
        match breakdown.iter_mut().find(|entry| entry.method == method) {
            Some(entry) => entry.amount += donation.amount(),
            None => breakdown.push(BreakdownEntry {
                method,
                amount: donation.amount(),
            }),
        }
    }

    breakdown
}

/// The `n` largest non-crypto donations, highest first.
///
/// Equal amounts keep their collection order.
pub fn top_donors(donations: &[Donation], n: usize) -> Vec<TopDonor> {
    let mut eligible: Vec<&Donation> = donations
        .iter()
        .filter(|d| !d.payment_method().is_crypto())
        .collect();

    // sort_by is stable
    eligible.sort_by(|a, b| b.amount().total_cmp(&a.amount()));
    eligible.truncate(n);

    eligible
        .into_iter()
        .map(|d| TopDonor {
            name: d.donor_name().to_string(),
            amount: d.amount(),
            date: d.date(),
        })
        .collect()
}

/// Split collected donations back into their channels.
pub fn split_by_channel(donations: &[Donation]) -> ChannelLists {
    let mut lists = ChannelLists::default();

    for donation in donations {
        let list = match donation.payment_method() {
            Channel::Cash => &mut lists.cash,
            Channel::Online => &mut lists.online,
            Channel::Crypto => &mut lists.crypto,
        };
        list.push(donation.clone());
    }

    lists
}

/// One slice of the payment method chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub method: Channel,
    pub amount: f64,
    pub color: String,
}

/// Chart data: the breakdown without crypto, coloured by position.
pub fn chart_slices(breakdown: &[BreakdownEntry]) -> Vec<ChartSlice> {
    breakdown
        .iter()
        .filter(|entry| !entry.method.is_crypto())
        .enumerate()
        .map(|(idx, entry)| ChartSlice {
            method: entry.method,
            amount: entry.amount,
            color: CHART_COLORS[idx % CHART_COLORS.len()].to_string(),
        })
        .collect()
}
