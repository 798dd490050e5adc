//! # Common Types
//!
//! This module contains the common types used throughout the application for
//! representing emission records, filter selections, and aggregation results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single emission observation as served by the emissions API.
///
/// Records are immutable once fetched. The `emissions` quantity is
/// deserialized leniently: numbers and numeric strings are accepted, while
/// null, absent, or unparsable values are kept as `None` and contribute zero
/// during aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    #[serde(default)]
    pub id: i64,
    /// Reporting country
    pub country: String,
    /// Emitting activity (e.g. "Transport", "Industry")
    pub activity: String,
    /// Kind of emission (e.g. "CO2", "CH4")
    pub emission_type: String,
    #[serde(default)]
    pub year: i32,
    /// Emitted quantity in kilotons, when the API supplied a usable number
    #[serde(default, deserialize_with = "lenient_f64")]
    pub emissions: Option<f64>,
}

impl EmissionRecord {
    /// The record's quantity with missing or non-finite values coerced to zero.
    pub fn emissions_or_zero(&self) -> f64 {
        self.emissions.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Accepts numbers and numeric strings; anything else becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

/// Filter selections for fetching emission records.
///
/// Unset fields are omitted from the request entirely, so an empty filter
/// fetches the full record set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmissionFilter {
    pub country: Option<String>,
    pub activity: Option<String>,
    pub emission_type: Option<String>,
    pub year: Option<i32>,
}

impl EmissionFilter {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.activity.is_none()
            && self.emission_type.is_none()
            && self.year.is_none()
    }

    /// The filter as HTTP query parameters, skipping unset fields.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        if let Some(activity) = &self.activity {
            params.push(("activity", activity.clone()));
        }
        if let Some(emission_type) = &self.emission_type {
            params.push(("emission_type", emission_type.clone()));
        }
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        params
    }
}

/// A key used for caching aggregation results per filter combination.
///
/// This struct is used as a key in the cache to store computed summaries for
/// specific combinations of country, activity, emission type, and year.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub country: Option<String>,
    pub activity: Option<String>,
    pub emission_type: Option<String>,
    pub year: Option<i32>,
}

impl From<&EmissionFilter> for CacheKey {
    fn from(filter: &EmissionFilter) -> Self {
        Self {
            country: filter.country.clone(),
            activity: filter.activity.clone(),
            emission_type: filter.emission_type.clone(),
            year: filter.year,
        }
    }
}

/// The ranked output of the aggregation pipeline.
///
/// Labels and values are index-aligned, ordered by total descending, and
/// bounded to at most [`MAX_DATA_POINTS`](crate::aggregate::MAX_DATA_POINTS)
/// entries. This is the sole artifact the chart consumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateSummary {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregateSummary {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// A summary with no labels or no values renders nothing.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lenient_emissions_accepts_numbers_and_numeric_strings() {
        let record: EmissionRecord = serde_json::from_str(
            r#"{"id":1,"country":"UK","activity":"Transport","emission_type":"CO2","year":2020,"emissions":5.5}"#,
        )
        .unwrap();
        assert_eq!(record.emissions, Some(5.5));

        let record: EmissionRecord = serde_json::from_str(
            r#"{"country":"UK","activity":"Transport","emission_type":"CO2","year":2020,"emissions":" 4.25 "}"#,
        )
        .unwrap();
        assert_eq!(record.emissions, Some(4.25));
    }

    #[test]
    fn lenient_emissions_coerces_garbage_to_none() {
        for raw in [
            r#"{"country":"UK","activity":"T","emission_type":"CO2","year":2020,"emissions":null}"#,
            r#"{"country":"UK","activity":"T","emission_type":"CO2","year":2020,"emissions":"n/a"}"#,
            r#"{"country":"UK","activity":"T","emission_type":"CO2","year":2020}"#,
            r#"{"country":"UK","activity":"T","emission_type":"CO2","year":2020,"emissions":[1,2]}"#,
        ] {
            let record: EmissionRecord = serde_json::from_str(raw).unwrap();
            assert_eq!(record.emissions, None, "input: {raw}");
            assert_eq!(record.emissions_or_zero(), 0.0);
        }
    }

    #[test]
    fn filter_query_params_skip_unset_fields() {
        let filter = EmissionFilter {
            country: Some("DE".to_string()),
            year: Some(2021),
            ..Default::default()
        };
        assert_eq!(
            filter.query_params(),
            vec![("country", "DE".to_string()), ("year", "2021".to_string())]
        );
        assert!(EmissionFilter::default().query_params().is_empty());
        assert!(EmissionFilter::default().is_empty());
    }

    #[test]
    fn summary_emptiness_requires_both_sides() {
        let summary = AggregateSummary {
            labels: vec!["UK - Transport".to_string()],
            values: Vec::new(),
        };
        assert!(summary.is_empty());
        assert!(AggregateSummary::default().is_empty());
    }
}
