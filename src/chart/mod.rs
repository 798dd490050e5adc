//! Chart lifecycle and rendering.
//!
//! [`ChartOrchestrator`] owns the single rendered chart: it binds a pixel
//! surface to the container's geometry, replaces the chart resource when new
//! aggregate data arrives, refits the surface in place on container resizes,
//! and tears everything down on destroy. The bar-chart drawing itself sits
//! behind the [`RenderBackend`] trait, implemented with plotters.

pub mod backend;
pub mod orchestrator;
mod styles;
mod surface;

#[cfg(test)]
mod tests;

pub use backend::{BarChart, PlottersBackend, RenderBackend};
pub use orchestrator::{ChartOrchestrator, Phase};
pub use styles::{bar_palette, ChartStyle, ChartTheme};
pub use surface::{ContainerGeometry, ContainerHandle, PixelSurface, SurfaceProvider};

use thiserror::Error;

/// Failures surfaced by chart initialization, update, and redraw.
#[derive(Error, Debug)]
pub enum ChartError {
    /// No drawing surface could be produced for the container.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    /// Malformed aggregate data, e.g. mismatched label/value lengths.
    #[error("invalid chart data: {0}")]
    InvalidData(String),
    /// Opaque failure reported by the rendering backend.
    #[error("rendering backend error: {0}")]
    RenderingBackend(String),
}
