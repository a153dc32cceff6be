//! Markdown and JSON report generation.
//!
//! This module renders a [`DonationReport`] the way the dashboard lays it
//! out: an overview with the headline total, the per-method breakdown and
//! chart data, the top donors, then one table per channel.

use super::format;
use crate::analysis::{chart_slices, ChartSlice};
use crate::models::{Channel, Donation, DonationReport, DonationStats};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Presentation settings.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Glyph prefixed to currency amounts.
    pub currency_symbol: String,
    /// Rows shown in each per-channel table.
    pub table_rows: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            table_rows: 5,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DonationReport, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Donation Report\n\n");
    output.push_str(&generate_overview_section(report, options));

    if report.org_id.is_none() {
        output.push_str("No organization is signed in; there is nothing to show.\n\n");
        output.push_str(&generate_footer(report.generated_at));
        return output;
    }

    output.push_str(&generate_breakdown_section(&report.stats, options));
    output.push_str(&generate_chart_section(&report.stats));
    output.push_str(&generate_top_donors_section(&report.stats, options));

    for channel in Channel::ALL {
        output.push_str(&generate_channel_section(
            channel,
            report.channels.get(channel),
            options,
        ));
    }

    output.push_str(&generate_footer(report.generated_at));

    output
}

/// Title used for a channel's table.
pub fn channel_title(channel: Channel) -> &'static str {
    match channel {
        Channel::Cash => "Cash Donations",
        Channel::Online => "UPI Donations",
        Channel::Crypto => "Cryptocurrency Donations",
    }
}

fn generate_overview_section(report: &DonationReport, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Donation Overview\n\n");
    section.push_str(&format!(
        "- **Organization:** {}\n",
        report.org_id.as_deref().unwrap_or("(not signed in)")
    ));
    section.push_str(&format!("- **Year:** {}\n", report.year));
    section.push_str(&format!("- **Donations:** {}\n", report.donation_count()));
    section.push_str("\n");

    if report.is_degraded() {
        let failed: Vec<_> = report
            .failed_channels
            .iter()
            .map(|c| c.payment_method())
            .collect();
        section.push_str(&format!(
            "> ⚠️ **Incomplete data:** could not load {} donations. Figures below exclude them.\n\n",
            failed.join(", ")
        ));
    }

    section.push_str(&format!(
        "**Total Donations: {}**\n\n",
        format::money(report.stats.total, &options.currency_symbol)
    ));

    section
}

fn generate_breakdown_section(stats: &DonationStats, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("### Donation Breakdown\n\n");
    section.push_str("| Method | Amount |\n");
    section.push_str("|:---|---:|\n");

    for entry in &stats.breakdown {
        section.push_str(&format!(
            "| {} | {} |\n",
            entry.method,
            format::channel_amount(entry.method, entry.amount, &options.currency_symbol)
        ));
    }
    section.push_str("\n");

    section
}

fn generate_chart_section(stats: &DonationStats) -> String {
    let slices = chart_slices(&stats.breakdown);
    if slices.is_empty() {
        return String::new();
    }

    let total: f64 = slices.iter().map(|s| s.amount).sum();
    let mut section = String::new();

    section.push_str("### Donation Methods\n\n");
    section.push_str("| Method | Share | Colour |\n");
    section.push_str("|:---|---:|:---:|\n");

    for slice in &slices {
        let share = if total > 0.0 {
            slice.amount / total * 100.0
        } else {
            0.0
        };
        section.push_str(&format!(
            "| {} | {:.1}% | `{}` |\n",
            slice.method, share, slice.color
        ));
    }
    section.push_str("\n");

    section
}

fn generate_top_donors_section(stats: &DonationStats, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("### Top Donors\n\n");

    if stats.top_donors.is_empty() {
        section.push_str("No donations recorded yet.\n\n");
        return section;
    }

    section.push_str("| # | Name | Amount | Date |\n");
    section.push_str("|:---:|:---|---:|:---|\n");

    for (i, donor) in stats.top_donors.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            escape_cell(&donor.name),
            format::money(donor.amount, &options.currency_symbol),
            donor.date.as_deref().map(escape_cell).unwrap_or_default()
        ));
    }
    section.push_str("\n");

    section
}

fn generate_channel_section(
    channel: Channel,
    donations: &[Donation],
    options: &ReportOptions,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", channel_title(channel)));

    if donations.is_empty() {
        section.push_str("No donations.\n\n");
        return section;
    }

    let amount_header = if channel.is_crypto() { "Tokens" } else { "Amount" };
    section.push_str(&format!("| Name | {} | Date | Method |\n", amount_header));
    section.push_str("|:---|---:|:---|:---|\n");

    for donation in donations.iter().take(options.table_rows) {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(donation.donor_name()),
            format::channel_amount(channel, donation.amount(), &options.currency_symbol),
            escape_cell(&donation.display_date()),
            donation.payment_method()
        ));
    }

    if donations.len() > options.table_rows {
        section.push_str(&format!(
            "\n*Showing {} of {} donations.*\n",
            options.table_rows,
            donations.len()
        ));
    }
    section.push_str("\n");

    section
}

fn generate_footer(generated_at: DateTime<Utc>) -> String {
    format!(
        "---\n\n*Generated {}*\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DonationRow<'a> {
    id: &'a str,
    name: &'a str,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    payment_method: Channel,
}

impl<'a> From<&'a Donation> for DonationRow<'a> {
    fn from(donation: &'a Donation) -> Self {
        Self {
            id: donation.id(),
            name: donation.donor_name(),
            amount: donation.amount(),
            date: donation.date(),
            payment_method: donation.payment_method(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    org_id: Option<&'a str>,
    year: &'a str,
    generated_at: DateTime<Utc>,
    degraded: bool,
    failed_channels: &'a [Channel],
    stats: &'a DonationStats,
    chart: Vec<ChartSlice>,
    cash: Vec<DonationRow<'a>>,
    online: Vec<DonationRow<'a>>,
    crypto: Vec<DonationRow<'a>>,
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DonationReport) -> Result<String> {
    let rows = |channel: Channel| {
        report
            .channels
            .get(channel)
            .iter()
            .map(DonationRow::from)
            .collect::<Vec<_>>()
    };

    let json = JsonReport {
        org_id: report.org_id.as_deref(),
        year: &report.year,
        generated_at: report.generated_at,
        degraded: report.is_degraded(),
        failed_channels: &report.failed_channels,
        stats: &report.stats,
        chart: chart_slices(&report.stats.breakdown),
        cash: rows(Channel::Cash),
        online: rows(Channel::Online),
        crypto: rows(Channel::Crypto),
    };

    serde_json::to_string_pretty(&json).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
