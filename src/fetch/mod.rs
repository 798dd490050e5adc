mod cache;
pub mod client;

pub use cache::CacheManager;
pub use client::{unique_field_values, EmissionClient, FetchError, RecordField, RecordSource};
