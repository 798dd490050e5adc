//! End-to-end pipeline tests: record source → aggregation → app state →
//! summary cache, using an in-memory record source.

use std::sync::Arc;

use async_trait::async_trait;
use ghgstats::aggregate::{aggregate_records, MAX_DATA_POINTS};
use ghgstats::app::App;
use ghgstats::fetch::{unique_field_values, RecordField, RecordSource};
use ghgstats::types::{CacheKey, EmissionFilter, EmissionRecord};

struct StaticRecordSource {
    records: Vec<EmissionRecord>,
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch_records(&self, filter: &EmissionFilter) -> Vec<EmissionRecord> {
        self.records
            .iter()
            .filter(|r| {
                filter.country.as_ref().map_or(true, |c| &r.country == c)
                    && filter.activity.as_ref().map_or(true, |a| &r.activity == a)
                    && filter
                        .emission_type
                        .as_ref()
                        .map_or(true, |t| &r.emission_type == t)
                    && filter.year.map_or(true, |y| r.year == y)
            })
            .cloned()
            .collect()
    }
}

fn record(country: &str, activity: &str, year: i32, emissions: f64) -> EmissionRecord {
    EmissionRecord {
        id: 0,
        country: country.to_string(),
        activity: activity.to_string(),
        emission_type: "CO2".to_string(),
        year,
        emissions: Some(emissions),
    }
}

fn sample_source() -> Arc<dyn RecordSource> {
    Arc::new(StaticRecordSource {
        records: vec![
            record("UK", "Transport", 2020, 5.5),
            record("UK", "Transport", 2021, 4.5),
            record("DE", "Industry", 2020, 10.0),
            record("FR", "Energy", 2021, 3.0),
        ],
    })
}

#[tokio::test]
async fn test_full_workflow() {
    let source = sample_source();
    let mut app = App::with_source(Arc::clone(&source));

    // Initial state
    assert!(app.records.is_empty());
    assert!(app.summary.is_none());

    // Fetch and aggregate the unfiltered record set
    let filter = EmissionFilter::default();
    let records = source.fetch_records(&filter).await;
    assert_eq!(records.len(), 4);

    let summary = aggregate_records(&records).await;
    // Equal totals tie-break: UK - Transport was inserted first.
    assert_eq!(
        summary.labels,
        vec![
            "UK - Transport".to_string(),
            "DE - Industry".to_string(),
            "FR - Energy".to_string()
        ]
    );
    assert_eq!(summary.values, vec![10.0, 10.0, 3.0]);

    app.apply_result(CacheKey::from(&filter), records, summary.clone());
    assert!(app.chart_dirty);
    assert!(!app.is_loading);

    // Dropdown options from the unfiltered set
    let countries = unique_field_values(&app.records, RecordField::Country);
    let activities = unique_field_values(&app.records, RecordField::Activity);
    let types = unique_field_values(&app.records, RecordField::EmissionType);
    app.set_options(countries, activities, types);
    assert_eq!(
        app.countries,
        vec!["DE".to_string(), "FR".to_string(), "UK".to_string()]
    );
    assert!(app.options_loaded);

    // Filtered fetch narrows the record set
    let uk_filter = EmissionFilter {
        country: Some("UK".to_string()),
        ..Default::default()
    };
    let uk_records = source.fetch_records(&uk_filter).await;
    assert_eq!(uk_records.len(), 2);
    let uk_summary = aggregate_records(&uk_records).await;
    assert_eq!(uk_summary.labels, vec!["UK - Transport".to_string()]);
    assert_eq!(uk_summary.values, vec![10.0]);
    app.filter = uk_filter.clone();
    app.apply_result(CacheKey::from(&uk_filter), uk_records, uk_summary.clone());

    // Both filter combinations are now served from the summary cache
    assert_eq!(app.get_cached_summary(&uk_filter), Some(uk_summary));
    assert_eq!(
        app.get_cached_summary(&EmissionFilter::default()),
        Some(summary)
    );

    // Year filtering
    let year_filter = EmissionFilter {
        year: Some(2021),
        ..Default::default()
    };
    let year_records = source.fetch_records(&year_filter).await;
    assert_eq!(year_records.len(), 2);
}

#[tokio::test]
async fn test_empty_source_is_valid_input() {
    let source: Arc<dyn RecordSource> = Arc::new(StaticRecordSource {
        records: Vec::new(),
    });
    let mut app = App::with_source(Arc::clone(&source));

    let filter = EmissionFilter::default();
    let records = source.fetch_records(&filter).await;
    let summary = aggregate_records(&records).await;
    assert!(summary.is_empty());

    app.apply_result(CacheKey::from(&filter), records, summary);
    assert!(app.summary.as_ref().unwrap().is_empty());
    assert!(app.error_message.is_none());
}

#[tokio::test]
async fn test_large_record_sets_stay_bounded() {
    let mut records = Vec::new();
    for i in 0..25_000 {
        records.push(record(
            &format!("C{:03}", i % 120),
            &format!("A{}", i % 7),
            2015 + (i % 10) as i32,
            (i % 500) as f64 * 0.01,
        ));
    }
    let source: Arc<dyn RecordSource> = Arc::new(StaticRecordSource { records });

    let fetched = source.fetch_records(&EmissionFilter::default()).await;
    let summary = aggregate_records(&fetched).await;

    assert_eq!(summary.len(), MAX_DATA_POINTS);
    assert!(summary
        .values
        .windows(2)
        .all(|pair| pair[0] >= pair[1]));
    let input_total: f64 = fetched.iter().map(|r| r.emissions_or_zero()).sum();
    let output_total: f64 = summary.values.iter().sum();
    assert!(output_total <= input_total);
}
