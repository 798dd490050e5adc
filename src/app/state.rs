use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use eframe::App as EApp;
use egui::TextureHandle;

use crate::chart::{ChartOrchestrator, ContainerGeometry, ContainerHandle, PlottersBackend};
use crate::config::ApiConfig;
use crate::fetch::{CacheManager, EmissionClient, RecordSource};
use crate::types::{AggregateSummary, CacheKey, EmissionFilter, EmissionRecord};

/// Earliest year offered in the year filter.
pub const MIN_YEAR: i32 = 2015;

/// Quiet period after the last filter change before records are refetched.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(150);

/// The two pages of the application.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Page {
    #[default]
    Home,
    Dashboard,
}

/// Main application state
pub struct App {
    pub page: Page,
    pub filter: EmissionFilter,
    pub countries: Vec<String>,
    pub activities: Vec<String>,
    pub emission_types: Vec<String>,
    pub available_years: Vec<i32>,
    pub records: Vec<EmissionRecord>,
    pub summary: Option<AggregateSummary>,
    pub summary_cache: CacheManager,
    pub is_loading: bool,
    pub options_loaded: bool,
    pub error_message: Option<String>,
    /// Set when a new summary is waiting for the chart to pick it up
    pub chart_dirty: bool,
    pub pending_reload_at: Option<Instant>,
    pub source: Arc<dyn RecordSource>,
}

impl App {
    pub fn with_source(source: Arc<dyn RecordSource>) -> Self {
        Self {
            page: Page::default(),
            filter: EmissionFilter::default(),
            countries: Vec::new(),
            activities: Vec::new(),
            emission_types: Vec::new(),
            available_years: available_years(),
            records: Vec::new(),
            summary: None,
            summary_cache: CacheManager::new(),
            is_loading: false,
            options_loaded: false,
            error_message: None,
            chart_dirty: false,
            pending_reload_at: None,
            source,
        }
    }

    /// Store a finished fetch-and-aggregate result.
    pub fn apply_result(
        &mut self,
        key: CacheKey,
        records: Vec<EmissionRecord>,
        summary: AggregateSummary,
    ) {
        self.summary_cache.store(key, summary.clone());
        self.records = records;
        self.summary = Some(summary);
        self.chart_dirty = true;
        self.is_loading = false;
    }

    /// Populate the filter dropdown options.
    pub fn set_options(
        &mut self,
        countries: Vec<String>,
        activities: Vec<String>,
        emission_types: Vec<String>,
    ) {
        self.countries = countries;
        self.activities = activities;
        self.emission_types = emission_types;
        self.options_loaded = true;
    }

    /// Debounced filter-change entry point: (re)arm the reload timer.
    pub fn schedule_reload(&mut self) {
        self.pending_reload_at = Some(Instant::now() + RELOAD_DEBOUNCE);
    }

    /// Consume the reload timer once it has expired.
    pub fn take_due_reload(&mut self) -> bool {
        if self.pending_reload_at.is_some_and(|at| Instant::now() >= at) {
            self.pending_reload_at = None;
            true
        } else {
            false
        }
    }

    pub fn reset_filters(&mut self) {
        self.filter = EmissionFilter::default();
        self.schedule_reload();
    }

    /// Get a cached summary for the given filter combination.
    pub fn get_cached_summary(&self, filter: &EmissionFilter) -> Option<AggregateSummary> {
        self.summary_cache.get(&CacheKey::from(filter)).cloned()
    }
}

impl Default for App {
    fn default() -> Self {
        let source: Arc<dyn RecordSource> = match EmissionClient::new(ApiConfig::from_env()) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                log::error!("failed to build emissions client: {e}");
                Arc::new(OfflineSource)
            }
        };
        Self::with_source(source)
    }
}

/// Fallback source when no HTTP client could be constructed.
struct OfflineSource;

#[async_trait]
impl RecordSource for OfflineSource {
    async fn fetch_records(&self, _filter: &EmissionFilter) -> Vec<EmissionRecord> {
        Vec::new()
    }
}

/// Current year down to [`MIN_YEAR`], newest first.
fn available_years() -> Vec<i32> {
    let current = Utc::now().year();
    (MIN_YEAR..=current.max(MIN_YEAR)).rev().collect()
}

/// UI-thread owner of the chart lifecycle: the orchestrator, the container
/// handle it watches, and the texture egui displays.
pub struct ChartPanel {
    pub container: ContainerHandle,
    pub chart: ChartOrchestrator<ContainerHandle, PlottersBackend>,
    pub texture: Option<TextureHandle>,
}

impl ChartPanel {
    pub fn new() -> Self {
        let container = ContainerHandle::new(ContainerGeometry::new(900.0, 500.0, 1.0));
        let chart = ChartOrchestrator::new(container.clone(), PlottersBackend::default());
        Self {
            container,
            chart,
            texture: None,
        }
    }

    /// Upload the orchestrator's surface to an egui texture.
    pub fn refresh_texture(&mut self, ctx: &egui::Context) {
        if let Some(surface) = self.chart.surface() {
            let (width, height) = surface.physical_size();
            let image = egui::ColorImage::from_rgb(
                [width as usize, height as usize],
                surface.pixels(),
            );
            self.texture =
                Some(ctx.load_texture("emissions_chart", image, egui::TextureOptions::LINEAR));
        }
    }
}

impl Default for ChartPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper around App for use with eframe
pub struct AppWrapper {
    pub app: Arc<Mutex<App>>,
    pub chart_panel: ChartPanel,
}

impl EApp for AppWrapper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Ok(mut app) = self.app.lock() {
            super::ui::draw_ui(&mut app, &mut self.chart_panel, ctx, Arc::clone(&self.app));
        } else {
            log::error!("failed to acquire app lock in update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_run_newest_first_down_to_min() {
        let years = available_years();
        assert_eq!(*years.last().unwrap(), MIN_YEAR);
        assert!(years.first().unwrap() >= years.last().unwrap());
        assert!(years.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn debounce_fires_only_after_quiet_period() {
        let mut app = App::with_source(Arc::new(OfflineSource));
        app.schedule_reload();
        assert!(!app.take_due_reload());

        tokio::time::sleep(RELOAD_DEBOUNCE + Duration::from_millis(20)).await;
        assert!(app.take_due_reload());
        // Consumed: a second poll stays quiet.
        assert!(!app.take_due_reload());
    }

    #[test]
    fn cached_summary_round_trips_through_filter_key() {
        let mut app = App::with_source(Arc::new(OfflineSource));
        let filter = EmissionFilter {
            country: Some("UK".to_string()),
            ..Default::default()
        };
        let summary = AggregateSummary {
            labels: vec!["UK - Transport".to_string()],
            values: vec![10.0],
        };
        app.filter = filter.clone();
        app.apply_result(CacheKey::from(&filter), Vec::new(), summary.clone());

        assert_eq!(app.get_cached_summary(&filter), Some(summary));
        assert!(app
            .get_cached_summary(&EmissionFilter::default())
            .is_none());
        assert!(app.chart_dirty);
        assert!(!app.is_loading);
    }
}
