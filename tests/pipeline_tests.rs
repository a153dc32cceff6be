use ngo_donations::analysis::{summarize, TOP_DONOR_COUNT};
use ngo_donations::collector::Collector;
use ngo_donations::report::{generate_json_report, generate_markdown_report, ReportOptions};
use ngo_donations::{Aggregator, BreakdownEntry, Channel, MemoryStore, StoredDocument};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn fixture_store() -> MemoryStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/donations.json");
    assert_ok!(MemoryStore::from_export_file(&path))
}

fn doc(path: &str, data: serde_json::Value) -> StoredDocument {
    StoredDocument::new(path, data)
}

#[tokio::test]
async fn test_fixture_report() {
    let report = Aggregator::new(Arc::new(fixture_store()))
        .run(Some("ngo-a1"), "2024")
        .await;

    assert_eq!(report.stats.total, 4950.5);
    assert_eq!(
        report.stats.breakdown,
        vec![
            BreakdownEntry { method: Channel::Cash, amount: 2200.0 },
            BreakdownEntry { method: Channel::Online, amount: 2750.5 },
            BreakdownEntry { method: Channel::Crypto, amount: 1_000_000.0 },
        ]
    );

    let top: Vec<_> = report
        .stats
        .top_donors
        .iter()
        .map(|d| (d.name.as_str(), d.amount))
        .collect();
    assert_eq!(
        top,
        vec![("Ravi Menon", 2500.0), ("Asha Verma", 1500.0), ("Kiran Rao", 700.0)]
    );

    assert_eq!(report.channels.cash.len(), 3);
    assert_eq!(report.channels.online.len(), 2);
    assert_eq!(report.channels.crypto.len(), 1);
    assert!(!report.is_degraded());
}

#[tokio::test]
async fn test_filter_excludes_other_scopes() {
    let donations = Collector::new(Arc::new(fixture_store()))
        .collect(Some("ngo-a1"), "2024")
        .await;

    for donation in &donations {
        let segments: Vec<_> = donation.path().split('/').collect();
        assert_eq!(segments[0], "donations");
        assert_eq!(segments[1], "ngo-a1");
        assert_eq!(segments[2], "2024");
        assert_eq!(segments[3], donation.payment_method().collection_id());
    }
    assert!(donations.iter().all(|d| d.donor_name() != "Other NGO donor"));
    assert!(donations.iter().all(|d| d.donor_name() != "Last year"));
}

#[tokio::test]
async fn test_channel_tagging_ignores_stored_method() {
    let donations = Collector::new(Arc::new(fixture_store()))
        .collect(Some("ngo-a1"), "2024")
        .await;

    let kiran = donations
        .iter()
        .find(|d| d.donor_name() == "Kiran Rao")
        .expect("Kiran's donation is collected");
    assert_eq!(kiran.payment_method(), Channel::Cash);
}

#[tokio::test]
async fn test_totals_and_breakdown_properties() {
    let store = MemoryStore::new(vec![
        doc("donations/o/2024/cash/1", json!({"amount": "12.25"})),
        doc("donations/o/2024/cash/2", json!({"amount": "n/a"})),
        doc("donations/o/2024/online/3", json!({"amount": 40})),
        doc("donations/o/2024/crypto/4", json!({"amount": "3"})),
        doc("donations/o/2024/crypto/5", json!({})),
    ]);
    let donations = Collector::new(Arc::new(store))
        .collect(Some("o"), "2024")
        .await;

    let stats = summarize(&donations);

    let non_crypto: f64 = donations
        .iter()
        .filter(|d| d.payment_method() != Channel::Crypto)
        .map(|d| d.amount())
        .sum();
    let all: f64 = donations.iter().map(|d| d.amount()).sum();
    let breakdown_sum: f64 = stats.breakdown.iter().map(|e| e.amount).sum();

    assert_eq!(stats.total, non_crypto);
    assert_eq!(stats.total, 52.25);
    assert_eq!(breakdown_sum, all);
    assert_eq!(breakdown_sum, 55.25);
}

#[tokio::test]
async fn test_top_donor_properties() {
    let amounts = [5, 80, 15, 80, 42, 7, 99];
    let mut documents: Vec<_> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| doc(&format!("donations/o/2024/online/{i}"), json!({"amount": amount})))
        .collect();
    documents.push(doc("donations/o/2024/crypto/x", json!({"amount": 1000})));

    let donations = Collector::new(Arc::new(MemoryStore::new(documents)))
        .collect(Some("o"), "2024")
        .await;
    let stats = summarize(&donations);

    assert_eq!(stats.top_donors.len(), TOP_DONOR_COUNT.min(amounts.len()));
    assert!(stats
        .top_donors
        .windows(2)
        .all(|pair| pair[0].amount >= pair[1].amount));

    let lowest_selected = stats.top_donors.last().map(|d| d.amount).unwrap_or(0.0);
    let mut remaining: Vec<f64> = amounts.iter().map(|a| *a as f64).collect();
    remaining.sort_by(|a, b| b.total_cmp(a));
    assert!(remaining[TOP_DONOR_COUNT..].iter().all(|a| *a <= lowest_selected));
    assert_eq!(
        stats.top_donors.iter().map(|d| d.amount).collect::<Vec<_>>(),
        vec![99.0, 80.0, 80.0]
    );
}

#[tokio::test]
async fn test_scenario_mixed_channels() {
    let store = MemoryStore::new(vec![
        doc("donations/ngo/2024/cash/1", json!({"amount": "100", "name": "A"})),
        doc("donations/ngo/2024/online/2", json!({"amount": 50, "name": "B"})),
        doc("donations/ngo/2024/crypto/3", json!({"amount": 5, "name": "C"})),
    ]);

    let report = Aggregator::new(Arc::new(store)).run(Some("ngo"), "2024").await;

    assert_eq!(report.stats.total, 150.0);
    assert_eq!(
        report.stats.breakdown,
        vec![
            BreakdownEntry { method: Channel::Cash, amount: 100.0 },
            BreakdownEntry { method: Channel::Online, amount: 50.0 },
            BreakdownEntry { method: Channel::Crypto, amount: 5.0 },
        ]
    );
    let top: Vec<_> = report
        .stats
        .top_donors
        .iter()
        .map(|d| (d.name.as_str(), d.amount))
        .collect();
    assert_eq!(top, vec![("A", 100.0), ("B", 50.0)]);
}

#[tokio::test]
async fn test_scenario_malformed_amount() {
    let store = MemoryStore::new(vec![doc(
        "donations/ngo/2024/cash/1",
        json!({"amount": "abc", "name": "Bad"}),
    )]);

    let report = Aggregator::new(Arc::new(store)).run(Some("ngo"), "2024").await;

    assert_eq!(report.stats.total, 0.0);
    assert_eq!(
        report.stats.breakdown,
        vec![BreakdownEntry { method: Channel::Cash, amount: 0.0 }]
    );
}

#[tokio::test]
async fn test_scenario_five_online_donations() {
    let store = MemoryStore::new(
        [10, 20, 30, 40, 50]
            .iter()
            .map(|a| doc(&format!("donations/ngo/2024/online/{a}"), json!({"amount": a})))
            .collect(),
    );

    let report = Aggregator::new(Arc::new(store)).run(Some("ngo"), "2024").await;

    let amounts: Vec<_> = report.stats.top_donors.iter().map(|d| d.amount).collect();
    assert_eq!(amounts, vec![50.0, 40.0, 30.0]);
}

#[tokio::test]
async fn test_scenario_no_signed_in_user() {
    let store = Arc::new(fixture_store());

    let report = Aggregator::new(store.clone()).run(None, "2024").await;

    assert_eq!(report.donation_count(), 0);
    assert_eq!(report.stats.total, 0.0);
    assert!(report.stats.breakdown.is_empty());
    assert!(report.stats.top_donors.is_empty());
    assert_eq!(store.query_calls(), 0);
}

#[tokio::test]
async fn test_store_failure_degrades_without_error() {
    let store = fixture_store().with_failure(Channel::Crypto);

    let report = Aggregator::new(Arc::new(store)).run(Some("ngo-a1"), "2024").await;

    assert!(report.is_degraded());
    assert_eq!(report.failed_channels, vec![Channel::Crypto]);
    assert_eq!(report.stats.total, 4950.5);
    assert_eq!(report.stats.breakdown.len(), 2);
}

#[tokio::test]
async fn test_unresponsive_store_is_bounded() {
    let store = fixture_store().with_delay(Duration::from_secs(10));

    let report = Aggregator::new(Arc::new(store))
        .with_fetch_timeout(Duration::from_millis(50))
        .run(Some("ngo-a1"), "2024")
        .await;

    assert_eq!(report.failed_channels, Channel::ALL.to_vec());
    assert_eq!(report.donation_count(), 0);
}

#[tokio::test]
async fn test_rendered_outputs() {
    let report = Aggregator::new(Arc::new(fixture_store()))
        .run(Some("ngo-a1"), "2024")
        .await;

    let markdown = generate_markdown_report(&report, &ReportOptions::default());
    assert!(markdown.contains("**Total Donations: ₹4,950.5**"));
    assert!(markdown.contains("| Crypto | 1,000,000 |"));
    assert!(markdown.contains("| Ravi Menon | ₹2,500 | 2024-02-01 | Online |"));
    assert!(markdown.contains("| Satoshi | 1,000,000 | 2024-03-09 | Crypto |"));

    let json: serde_json::Value = serde_json::from_str(&assert_ok!(generate_json_report(&report))).unwrap();
    assert_eq!(json["org_id"], json!("ngo-a1"));
    assert_eq!(json["cash"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["stats"]["topDonors"][0]["name"], json!("Ravi Menon"));
}
