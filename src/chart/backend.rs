use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;
use once_cell::sync::Lazy;
use plotters::prelude::*;

use super::styles::{bar_palette, ChartStyle, ChartTheme};
use super::surface::PixelSurface;
use super::ChartError;
use crate::utils::{format_value, truncate_label};

// Global frame cache with a 5-minute expiration
static FRAME_CACHE: Lazy<Arc<Mutex<LruCache<FrameCacheKey, (Vec<u8>, Instant)>>>> =
    Lazy::new(|| Arc::new(Mutex::new(LruCache::new(NonZeroUsize::new(10).unwrap()))));

const FRAME_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Hash, Eq, PartialEq)]
struct FrameCacheKey {
    data_hash: u64,
    width: u32,
    height: u32,
    ratio_millis: u32,
}

impl FrameCacheKey {
    fn new(labels: &[String], values: &[f64], surface: &PixelSurface) -> Self {
        let mut hasher = DefaultHasher::new();
        labels.hash(&mut hasher);
        for value in values {
            value.to_bits().hash(&mut hasher);
        }
        let (width, height) = surface.physical_size();

        Self {
            data_hash: hasher.finish(),
            width,
            height,
            ratio_millis: (surface.pixel_ratio() * 1000.0) as u32,
        }
    }
}

// Helper function to wrap backend errors
fn wrap_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::RenderingBackend(e.to_string())
}

/// Bar-chart drawing primitive the orchestrator drives.
///
/// The capability contract of the wrapped charting layer: create a chart
/// bound to labels and values, then drive it through its handle.
pub trait RenderBackend {
    type Chart: BarChart;

    /// Render a bar chart for `labels`/`values` into `surface` and return
    /// the handle owning its data binding.
    fn create_bar_chart(
        &self,
        surface: &mut PixelSurface,
        labels: &[String],
        values: &[f64],
    ) -> Result<Self::Chart, ChartError>;
}

/// Handle to one rendered chart.
pub trait BarChart {
    /// Redraw at the surface's current geometry.
    fn resize(&mut self, surface: &mut PixelSurface) -> Result<(), ChartError>;

    /// Redraw the handle's bound data.
    fn update(&mut self, surface: &mut PixelSurface) -> Result<(), ChartError>;

    /// Release everything the handle holds.
    fn destroy(&mut self);
}

/// Plotters-based implementation of the rendering backend.
#[derive(Clone, Default)]
pub struct PlottersBackend {
    pub theme: ChartTheme,
    pub style: ChartStyle,
}

impl PlottersBackend {
    pub fn new(theme: ChartTheme, style: ChartStyle) -> Self {
        Self { theme, style }
    }
}

impl RenderBackend for PlottersBackend {
    type Chart = PlottersBarChart;

    fn create_bar_chart(
        &self,
        surface: &mut PixelSurface,
        labels: &[String],
        values: &[f64],
    ) -> Result<PlottersBarChart, ChartError> {
        let mut chart = PlottersBarChart {
            labels: labels.to_vec(),
            values: values.to_vec(),
            theme: self.theme.clone(),
            style: self.style.clone(),
        };
        chart.update(surface)?;
        Ok(chart)
    }
}

/// A rendered horizontal bar chart bound to its data.
#[derive(Debug)]
pub struct PlottersBarChart {
    labels: Vec<String>,
    values: Vec<f64>,
    theme: ChartTheme,
    style: ChartStyle,
}

impl BarChart for PlottersBarChart {
    fn resize(&mut self, surface: &mut PixelSurface) -> Result<(), ChartError> {
        render_cached(surface, &self.labels, &self.values, &self.theme, &self.style)
    }

    fn update(&mut self, surface: &mut PixelSurface) -> Result<(), ChartError> {
        render_cached(surface, &self.labels, &self.values, &self.theme, &self.style)
    }

    fn destroy(&mut self) {
        self.labels.clear();
        self.values.clear();
    }
}

/// Render through the frame cache, drawing only on a miss.
fn render_cached(
    surface: &mut PixelSurface,
    labels: &[String],
    values: &[f64],
    theme: &ChartTheme,
    style: &ChartStyle,
) -> Result<(), ChartError> {
    let key = FrameCacheKey::new(labels, values, surface);

    let cached = {
        let mut cache = FRAME_CACHE.lock().unwrap();
        cache.get(&key).and_then(|(pixels, stamp)| {
            (stamp.elapsed() < FRAME_CACHE_TTL).then(|| pixels.clone())
        })
    };
    if let Some(pixels) = cached {
        if pixels.len() == surface.pixels().len() {
            surface.pixels_mut().copy_from_slice(&pixels);
            return Ok(());
        }
    }

    draw_bar_chart(surface, labels, values, theme, style)?;

    FRAME_CACHE
        .lock()
        .unwrap()
        .put(key, (surface.pixels().to_vec(), Instant::now()));
    Ok(())
}

/// Draw a horizontal bar chart into the surface buffer.
///
/// Bars are laid out largest-first from the top; fonts, margins, and label
/// areas scale with the surface's pixel ratio.
fn draw_bar_chart(
    surface: &mut PixelSurface,
    labels: &[String],
    values: &[f64],
    theme: &ChartTheme,
    style: &ChartStyle,
) -> Result<(), ChartError> {
    if labels.len() != values.len() {
        return Err(ChartError::InvalidData(format!(
            "{} labels against {} values",
            labels.len(),
            values.len()
        )));
    }

    let (width, height) = surface.physical_size();
    let ratio = surface.pixel_ratio();
    let scaled = |v: u32| ((v as f32) * ratio).round().max(1.0) as u32;

    let bar_count = labels.len();
    let root = BitMapBackend::with_buffer(surface.pixels_mut(), (width, height)).into_drawing_area();
    root.fill(&theme.background_color).map_err(wrap_err)?;

    if bar_count == 0 {
        root.present().map_err(wrap_err)?;
        return Ok(());
    }

    let max_value = values.iter().cloned().fold(f64::MIN, f64::max);
    let x_max = if max_value > 0.0 { max_value * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Top Emitters",
            ("sans-serif", scaled(style.font_size + 6))
                .into_font()
                .color(&theme.text_color),
        )
        .margin(scaled(style.margin))
        .x_label_area_size(scaled(style.x_label_area_size))
        .y_label_area_size(scaled(style.y_label_area_size))
        .build_cartesian_2d(0f64..x_max, 0f64..bar_count as f64)
        .map_err(wrap_err)?;

    // Store the labels in a longer-lived variable for the axis formatter
    let axis_labels = labels.to_vec();
    let max_chars = style.max_label_chars;
    let y_label_formatter = move |y: &f64| {
        if y.fract() != 0.0 {
            return String::new();
        }
        let slot = *y as usize;
        if slot >= axis_labels.len() {
            return String::new();
        }
        // Slot 0 is the bottom of the plot; the top bar holds the largest total.
        let index = axis_labels.len() - 1 - slot;
        truncate_label(&axis_labels[index], max_chars)
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(theme.grid_color)
        .axis_style(theme.axis_color)
        .x_desc("Emissions (kt)")
        .label_style(
            ("sans-serif", scaled(style.font_size))
                .into_font()
                .color(&theme.text_color),
        )
        .y_labels(bar_count + 1)
        .y_label_formatter(&y_label_formatter)
        .x_label_formatter(&|x| format_value(*x))
        .draw()
        .map_err(wrap_err)?;

    let palette = bar_palette(bar_count);
    chart
        .draw_series(values.iter().enumerate().map(|(i, value)| {
            let y0 = (bar_count - 1 - i) as f64 + (1.0 - style.bar_fraction) / 2.0;
            let y1 = y0 + style.bar_fraction;
            Rectangle::new(
                [(0.0, y0), (value.max(0.0), y1)],
                palette[i].mix(0.9).filled(),
            )
        }))
        .map_err(wrap_err)?;

    root.present().map_err(wrap_err)?;
    Ok(())
}
