//! HTTP client for the emissions API.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::types::{EmissionFilter, EmissionRecord};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Boundary through which the dashboard obtains emission records.
///
/// Implementations return an empty set on transport failure rather than
/// propagating the error; the dashboard treats an empty set as valid input.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the records matching `filter`.
    async fn fetch_records(&self, filter: &EmissionFilter) -> Vec<EmissionRecord>;
}

/// Record fields whose distinct values populate the filter dropdowns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordField {
    Country,
    Activity,
    EmissionType,
}

/// Emissions API client.
///
/// Unfiltered responses are cached in memory and reused, so populating the
/// three filter dropdowns costs a single request once the cache is warm.
pub struct EmissionClient {
    http: Client,
    config: ApiConfig,
    unfiltered_cache: Mutex<Option<Vec<EmissionRecord>>>,
}

impl EmissionClient {
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            unfiltered_cache: Mutex::new(None),
        })
    }

    async fn try_fetch(&self, filter: &EmissionFilter) -> Result<Vec<EmissionRecord>, FetchError> {
        let url = Url::parse(&self.config.emissions_url())?;
        let body = self
            .http
            .get(url)
            .query(&filter.query_params())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Sorted distinct values of a record field across the unfiltered set.
    pub async fn unique_values(&self, field: RecordField) -> Vec<String> {
        let records = self.fetch_records(&EmissionFilter::default()).await;
        unique_field_values(&records, field)
    }
}

#[async_trait]
impl RecordSource for EmissionClient {
    async fn fetch_records(&self, filter: &EmissionFilter) -> Vec<EmissionRecord> {
        let unfiltered = filter.is_empty();
        if unfiltered {
            if let Some(cached) = self.unfiltered_cache.lock().unwrap().clone() {
                return cached;
            }
        }

        match self.try_fetch(filter).await {
            Ok(records) => {
                log::info!("fetched {} emission records", records.len());
                if unfiltered {
                    *self.unfiltered_cache.lock().unwrap() = Some(records.clone());
                }
                records
            }
            Err(e) => {
                // The surrounding app treats an empty set as valid input.
                log::error!("failed to fetch emission records: {e}");
                Vec::new()
            }
        }
    }
}

/// Distinct non-empty values of `field`, sorted and deduplicated.
pub fn unique_field_values(records: &[EmissionRecord], field: RecordField) -> Vec<String> {
    let mut values = BTreeSet::new();
    for record in records {
        let value = match field {
            RecordField::Country => &record.country,
            RecordField::Activity => &record.activity,
            RecordField::EmissionType => &record.emission_type,
        };
        if !value.is_empty() {
            values.insert(value.clone());
        }
    }
    values.into_iter().collect()
}
