//! # Emissions Dashboard Library
//!
//! `ghgstats` is a library for fetching, aggregating, and visualizing
//! greenhouse-gas emission records. It renders a dashboard with a ranked bar
//! chart of the top emitting country/activity groups, backed by an
//! aggregation pipeline that never blocks the UI thread.
//!
//! ## Features
//!
//! - Fetch emission records from an HTTP API with response caching
//! - Filter by country, activity, emission type, and year
//! - Chunked, cooperatively-yielding aggregation of large record sets
//! - Ranked top-30 summaries with stable tie ordering
//! - Chart lifecycle management: resize, pixel-ratio scaling, clean teardown
//! - Per-filter summary caching for instant filter flips
//!
//! ## Example
//!
//! ```no_run
//! use ghgstats::app::{App, AppWrapper, ChartPanel};
//! use std::sync::{Arc, Mutex};
//! use eframe::NativeOptions;
//!
//! // Create a new application instance
//! let app = Arc::new(Mutex::new(App::default()));
//! let wrapper = AppWrapper { app, chart_panel: ChartPanel::new() };
//!
//! // Run the application with eframe
//! eframe::run_native(
//!     "Emissions Dashboard",
//!     NativeOptions::default(),
//!     Box::new(|_cc| Ok(Box::new(wrapper))),
//! ).unwrap();
//! ```

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod config;
pub mod fetch;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use app::App as GhgStatsApp;
pub use types::{AggregateSummary, CacheKey, EmissionFilter, EmissionRecord};
