use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use serde_json::json;

use tycg_stats::app::App;
use tycg_stats::catalog::{Catalog, SearchOutcome};
use tycg_stats::client::StatsClient;
use tycg_stats::dataset::Dataset;
use tycg_stats::domain::{SeriesKey, TimeRange};
use tycg_stats::error::StatsError;
use tycg_stats::guard::Payload;

#[derive(Default)]
struct MockClient {
    dataset: Option<Dataset>,
    ranges: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    fn with(value: serde_json::Value) -> Self {
        Self {
            dataset: Some(serde_json::from_value(value).unwrap()),
            ranges: Arc::default(),
        }
    }

    fn failing() -> Self {
        Self::default()
    }
}

impl StatsClient for MockClient {
    fn fetch_series(&self, _key: &SeriesKey, range: &TimeRange) -> Result<Dataset, StatsError> {
        self.ranges.lock().unwrap().push(range.to_string());
        self.dataset.clone().ok_or(StatsError::FetchFailed)
    }
}

fn key() -> SeriesKey {
    SeriesKey::new("0001", "0002", "000005")
}

fn district_rows() -> serde_json::Value {
    json!([
        {"District": "桃園市", "Value": 1000},
        {"District": "A", "Value": 200},
        {"District": "B", "Value": 300},
        {"District": "C", "Value": 500}
    ])
}

#[test]
fn default_window_is_used_when_range_is_missing() {
    let client = MockClient::with(district_rows());
    let ranges = Arc::clone(&client.ranges);
    let app = App::new(client, None).with_current_year(2025);
    app.fetch_series(&key(), None, None).unwrap();
    app.fetch_series(&key(), Some("2019"), None).unwrap();
    app.fetch_series(&key(), Some("2023"), Some("2024")).unwrap();

    assert_eq!(
        *ranges.lock().unwrap(),
        vec!["2021 ~ 2025", "2021 ~ 2025", "2023 ~ 2024"]
    );
}

#[test]
fn invalid_year_is_an_error() {
    let app = App::new(MockClient::with(district_rows()), None);
    let err = app.fetch_series(&key(), Some("24"), Some("2025")).unwrap_err();
    assert_matches!(err, StatsError::InvalidYear(_));
}

#[test]
fn analyze_rejects_malformed_year_without_fetching() {
    let client = MockClient::with(district_rows());
    let ranges = Arc::clone(&client.ranges);
    let app = App::new(client, None).with_current_year(2025);
    let err = app.analyze(&key(), Some("2023"), Some("25")).unwrap_err();
    assert_matches!(err, StatsError::InvalidYear(_));
    assert!(ranges.lock().unwrap().is_empty());
}

#[test]
fn analysis_excludes_aggregate_row() {
    let app = App::new(MockClient::with(district_rows()), None).with_current_year(2025);
    let text = app.analyze(&key(), None, None).unwrap().to_string();

    assert!(text.contains("- Source: 0001-0002-000005"));
    assert!(text.contains("- Time range: 2021 ~ 2025"));
    assert!(text.contains("- Total: 1,000"));
    assert!(text.contains("- Mean: 333.33"));
    assert!(text.contains("- Extremes: highest C (500), lowest A (200)"));
    assert!(text.contains("(aggregate row \"桃園市\" excluded)"));
    assert!(text.contains("   - #1: C (500)"));
    assert!(!text.contains("#1: 桃園市"));
}

#[test]
fn analysis_is_idempotent() {
    let app = App::new(MockClient::with(district_rows()), None).with_current_year(2025);
    let first = app.analyze(&key(), None, None).unwrap();
    let second = app.analyze(&key(), None, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn fetch_failure_becomes_unavailable_report() {
    let app = App::new(MockClient::failing(), None).with_current_year(2025);
    let report = app.analyze(&key(), None, None).unwrap();
    assert!(!report.is_available());
    assert!(report.to_string().contains("analysis not possible"));

    let err = app.statistics_data(&key(), None, None).unwrap_err();
    assert_matches!(err, StatsError::FetchFailed);
}

#[test]
fn custom_aggregate_label() {
    let rows = json!([
        {"區域別": "總計", "人數": 30},
        {"區域別": "甲", "人數": 10},
        {"區域別": "乙", "人數": 20}
    ]);
    let app = App::new(MockClient::with(rows), None)
        .with_current_year(2025)
        .with_aggregate_label("總計");
    let text = app.analyze(&key(), None, None).unwrap().to_string();
    assert!(text.contains("- Total: 30"));
    assert!(text.contains("- Mean: 15.00"));
}

#[test]
fn large_series_is_previewed() {
    let rows = (0..51)
        .map(|i| json!({"年月別": format!("r{i}"), "值": i}))
        .collect::<Vec<_>>();
    let app = App::new(MockClient::with(json!(rows)), None);
    let payload = app.statistics_data(&key(), None, None).unwrap();
    assert_matches!(payload, Payload::Preview(ref preview) if preview.preview_data.len() == 5);

    let rows = (0..50)
        .map(|i| json!({"年月別": format!("r{i}"), "值": i}))
        .collect::<Vec<_>>();
    let app = App::new(MockClient::with(json!(rows)), None);
    let payload = app.statistics_data(&key(), None, None).unwrap();
    assert_matches!(payload, Payload::Full(ref data) if data.len() == 50);
}

#[test]
fn search_without_catalog_is_unavailable() {
    let app = App::new(MockClient::failing(), None);
    assert_matches!(
        app.search_catalog("人口"),
        Err(StatsError::CatalogUnavailable)
    );
}

#[test]
fn search_on_empty_catalog_has_no_results() {
    let catalog = Catalog::default();
    let app = App::new(MockClient::failing(), Some(&catalog));
    assert_eq!(app.search_catalog("人口").unwrap(), SearchOutcome::NoResults);
}
