use std::sync::{Arc, Mutex};
use std::time::Duration;

use egui::{ComboBox, Context};

use super::state::{App, ChartPanel, Page};
use crate::aggregate::aggregate_records;
use crate::chart::{ContainerGeometry, Phase};
use crate::fetch::{unique_field_values, RecordField, RecordSource};
use crate::types::{CacheKey, EmissionFilter};
use crate::utils::format_value;

/// Draw the main application UI
pub fn draw_ui(app: &mut App, panel: &mut ChartPanel, ctx: &Context, app_arc: Arc<Mutex<App>>) {
    match app.page {
        Page::Home => draw_home(app, ctx),
        Page::Dashboard => draw_dashboard(app, panel, ctx, app_arc),
    }
}

fn draw_home(app: &mut App, ctx: &Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(140.0);
            ui.heading("Dashboard of Emissions");
            ui.add_space(8.0);
            ui.label("Comprehensive analytics and insights for tracking and reducing your carbon footprint");
            ui.add_space(24.0);
            if ui.button("View Dashboard").clicked() {
                app.page = Page::Dashboard;
            }
        });
    });
}

fn draw_dashboard(app: &mut App, panel: &mut ChartPanel, ctx: &Context, app_arc: Arc<Mutex<App>>) {
    // First visit: fetch records and filter options concurrently.
    if !app.options_loaded && !app.is_loading {
        start_initial_load(app, app_arc.clone());
    }

    egui::SidePanel::left("filter_panel").show(ctx, |ui| {
        ui.heading("Filters");
        ui.separator();

        let prev_filter = app.filter.clone();

        option_combo(ui, "country_filter", "Country:", &mut app.filter.country, &app.countries);
        option_combo(
            ui,
            "activity_filter",
            "Activity:",
            &mut app.filter.activity,
            &app.activities,
        );
        option_combo(
            ui,
            "emission_type_filter",
            "Emission type:",
            &mut app.filter.emission_type,
            &app.emission_types,
        );

        ui.label("Year:");
        let year_text = app
            .filter
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "All".to_string());
        ComboBox::new("year_filter", "")
            .selected_text(year_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.filter.year, None, "All");
                for year in app.available_years.clone() {
                    ui.selectable_value(&mut app.filter.year, Some(year), year.to_string());
                }
            });

        if prev_filter != app.filter {
            app.schedule_reload();
        }

        ui.separator();
        if ui.button("Reset Filters").clicked() {
            app.reset_filters();
        }

        ui.separator();
        if ui.button("Back to Home").clicked() {
            app.page = Page::Home;
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Emissions by Country and Activity");
        ui.separator();

        if let Some(error) = &app.error_message {
            ui.colored_label(egui::Color32::RED, error);
        }
        if app.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading emissions...");
            });
        }

        ui.label(format!("Records: {}", app.records.len()));
        if let Some(summary) = &app.summary {
            let total: f64 = summary.values.iter().sum();
            ui.label(format!(
                "Groups shown: {} ({} kt)",
                summary.len(),
                format_value(total)
            ));
        }
        ui.separator();

        // The remaining panel area is the chart container.
        let available = ui.available_size();
        let width = available.x.max(0.0);
        let height = if available.y > 0.0 { available.y } else { 500.0 };
        panel
            .container
            .set_geometry(ContainerGeometry::new(width, height, ctx.pixels_per_point()));

        if app.chart_dirty {
            app.chart_dirty = false;
            sync_chart(app, panel, ctx);
        }

        // Drive coalesced resize notifications and the delayed resync.
        match panel.chart.tick() {
            Ok(true) => panel.refresh_texture(ctx),
            Ok(false) => {}
            Err(e) => {
                log::error!("chart redraw failed: {e}");
                app.error_message = Some(format!("Failed to redraw chart: {e}"));
            }
        }

        if panel.chart.has_chart() {
            if let Some(texture) = &panel.texture {
                ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(width, height)));
            }
        } else if !app.is_loading {
            ui.label("No emission data for the current filters.");
        }
    });

    if app.take_due_reload() {
        trigger_reload(app, app_arc);
    }

    // Keep the frame loop moving while timers are pending.
    ctx.request_repaint_after(Duration::from_millis(100));
}

/// A dropdown over optional string values, with "All" clearing the field.
fn option_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    value: &mut Option<String>,
    options: &[String],
) {
    ui.label(label);
    let selected = value.clone().unwrap_or_else(|| "All".to_string());
    ComboBox::new(id, "")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            ui.selectable_value(value, None, "All");
            for option in options {
                ui.selectable_value(value, Some(option.clone()), option);
            }
        });
}

/// Push the latest summary into the chart, creating it on first data.
fn sync_chart(app: &mut App, panel: &mut ChartPanel, ctx: &Context) {
    let Some(summary) = app.summary.clone() else {
        return;
    };
    let result = match panel.chart.phase() {
        Phase::Uninitialized => panel.chart.initialize(&summary),
        _ => panel.chart.update(&summary),
    };
    match result {
        Ok(()) => {
            app.error_message = None;
            panel.refresh_texture(ctx);
        }
        Err(e) => {
            log::error!("chart error: {e}");
            app.error_message = Some(format!("Failed to render chart: {e}"));
        }
    }
}

/// Reload records for the current filter, hitting the summary cache first.
fn trigger_reload(app: &mut App, app_arc: Arc<Mutex<App>>) {
    if let Some(summary) = app.get_cached_summary(&app.filter) {
        // Use cached summary
        app.summary = Some(summary);
        app.chart_dirty = true;
        app.is_loading = false;
        return;
    }

    app.is_loading = true;
    app.error_message = None;
    let filter = app.filter.clone();
    let source = Arc::clone(&app.source);

    tokio::spawn(async move {
        let records = source.fetch_records(&filter).await;
        let summary = aggregate_records(&records).await;
        let mut app = app_arc.lock().unwrap();
        app.apply_result(CacheKey::from(&filter), records, summary);
    });
}

/// Fetch the filtered records and the dropdown options concurrently.
fn start_initial_load(app: &mut App, app_arc: Arc<Mutex<App>>) {
    app.is_loading = true;
    let filter = app.filter.clone();
    let source = Arc::clone(&app.source);

    tokio::spawn(async move {
        let (records, options) =
            futures::join!(source.fetch_records(&filter), load_filter_options(&source));
        let summary = aggregate_records(&records).await;

        let mut app = app_arc.lock().unwrap();
        let (countries, activities, emission_types) = options;
        app.set_options(countries, activities, emission_types);
        app.apply_result(CacheKey::from(&filter), records, summary);
    });
}

/// Distinct dropdown values derived from the unfiltered record set.
async fn load_filter_options(
    source: &Arc<dyn RecordSource>,
) -> (Vec<String>, Vec<String>, Vec<String>) {
    let records = source.fetch_records(&EmissionFilter::default()).await;
    (
        unique_field_values(&records, RecordField::Country),
        unique_field_values(&records, RecordField::Activity),
        unique_field_values(&records, RecordField::EmissionType),
    )
}
