//! Incremental aggregation of emission records.
//!
//! Records are bucketed by a composite group key and summed into a ranked,
//! size-bounded [`AggregateSummary`]. Large record sets are consumed in
//! bounded chunks with a cooperative yield between chunks, so the UI thread
//! keeps getting scheduling turns while tens of thousands of records are
//! processed.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{AggregateSummary, EmissionRecord};

/// Upper bound on chart entries; buckets beyond the top 30 are dropped.
pub const MAX_DATA_POINTS: usize = 30;

/// Records processed per scheduling turn.
pub const CHUNK_SIZE: usize = 1000;

/// Group key used by the dashboard: `"<country> - <activity>"`.
pub fn country_activity_key(record: &EmissionRecord) -> String {
    format!("{} - {}", record.country, record.activity)
}

/// Aggregate records into the dashboard's ranked summary.
///
/// Groups by [`country_activity_key`], sums emission quantities (missing or
/// unparsable quantities count as zero without dropping the record's key),
/// sorts descending by total, and keeps the top [`MAX_DATA_POINTS`]. Empty
/// input resolves immediately with an empty summary.
pub async fn aggregate_records(records: &[EmissionRecord]) -> AggregateSummary {
    aggregate_records_by(records, country_activity_key).await
}

/// Aggregate with a caller-provided group key.
///
/// Processes [`CHUNK_SIZE`] records per scheduling turn and yields to the
/// runtime between chunks. All accumulation state is local to the call, so
/// concurrent aggregations over independent inputs never interfere.
///
/// Equal totals keep first-insertion order: buckets are kept in the order
/// their key was first seen and the final sort is stable.
pub async fn aggregate_records_by<K>(records: &[EmissionRecord], key_fn: K) -> AggregateSummary
where
    K: Fn(&EmissionRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, f64)> = Vec::new();

    for (i, chunk) in records.chunks(CHUNK_SIZE).enumerate() {
        if i > 0 {
            // Let pending UI work run between chunks.
            tokio::task::yield_now().await;
        }
        for record in chunk {
            let key = key_fn(record);
            let value = record.emissions_or_zero();
            match index.get(&key) {
                Some(&slot) => buckets[slot].1 += value,
                None => {
                    index.insert(key.clone(), buckets.len());
                    buckets.push((key, value));
                }
            }
        }
    }

    buckets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    buckets.truncate(MAX_DATA_POINTS);

    let mut labels = Vec::with_capacity(buckets.len());
    let mut values = Vec::with_capacity(buckets.len());
    for (key, total) in buckets {
        labels.push(key);
        values.push(total);
    }
    AggregateSummary { labels, values }
}
