use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::backend::{BarChart, RenderBackend};
use super::surface::{ContainerGeometry, PixelSurface, SurfaceProvider};
use super::ChartError;
use crate::types::AggregateSummary;

/// Lifecycle phase of the orchestrator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Updating,
    /// Terminal; all drawing resources released.
    Destroyed,
}

/// Delay before the post-update geometry resync, covering the layout race
/// between surface attachment and first paint.
const RESYNC_DELAY: Duration = Duration::from_millis(100);

/// Owns the lifecycle of the single rendered chart.
///
/// The orchestrator holds at most one live chart resource at a time: data
/// changes always destroy the previous resource before creating its
/// replacement, while geometry changes refit the surface in place and redraw
/// through the existing handle. [`tick`](Self::tick) drives coalesced resize
/// notifications and the delayed resync from the host's frame loop; nothing
/// here spawns background work, so `destroy` leaves no dangling timers.
pub struct ChartOrchestrator<P: SurfaceProvider, B: RenderBackend> {
    provider: P,
    backend: B,
    phase: Phase,
    surface: Option<PixelSurface>,
    chart: Option<B::Chart>,
    resize_rx: Option<watch::Receiver<ContainerGeometry>>,
    resync_at: Option<Instant>,
}

impl<P: SurfaceProvider, B: RenderBackend> ChartOrchestrator<P, B> {
    pub fn new(provider: P, backend: B) -> Self {
        Self {
            provider,
            backend,
            phase: Phase::Uninitialized,
            surface: None,
            chart: None,
            resize_rx: None,
            resync_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Whether a chart resource is currently alive.
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    /// The rendered surface, when one is bound.
    pub fn surface(&self) -> Option<&PixelSurface> {
        self.surface.as_ref()
    }

    /// Bind to the container and render `initial` when it is non-empty.
    ///
    /// Acquires a surface sized to the container's layout box times the
    /// device pixel ratio, subscribes to resize notifications, and schedules
    /// the delayed geometry resync. On failure the orchestrator stays
    /// `Uninitialized` with no resources bound.
    pub fn initialize(&mut self, initial: &AggregateSummary) -> Result<(), ChartError> {
        if self.phase != Phase::Uninitialized {
            log::warn!("chart initialize ignored in phase {:?}", self.phase);
            return Ok(());
        }

        let mut surface = self.provider.create_surface()?;
        if !initial.is_empty() {
            validate(initial)?;
            let chart =
                self.backend
                    .create_bar_chart(&mut surface, &initial.labels, &initial.values)?;
            self.chart = Some(chart);
        }
        self.surface = Some(surface);

        let mut resize_rx = self.provider.subscribe_resize();
        resize_rx.borrow_and_update();
        self.resize_rx = Some(resize_rx);

        self.resync_at = Some(Instant::now() + RESYNC_DELAY);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Replace the chart's data.
    ///
    /// Empty data is a no-op: the previous chart persists. Otherwise the
    /// existing resource is destroyed and a fresh one created for `data`,
    /// followed by a delayed geometry resync. A backend failure leaves the
    /// orchestrator `Ready` with no chart resource; malformed data leaves the
    /// previous chart untouched.
    pub fn update(&mut self, data: &AggregateSummary) -> Result<(), ChartError> {
        if self.phase != Phase::Ready {
            log::warn!("chart update ignored in phase {:?}", self.phase);
            return Ok(());
        }
        if data.is_empty() {
            return Ok(());
        }
        validate(data)?;

        self.phase = Phase::Updating;
        // Exactly one live resource: destroy before creating the replacement.
        if let Some(mut old) = self.chart.take() {
            old.destroy();
        }
        let result = match self.surface.as_mut() {
            Some(surface) => self
                .backend
                .create_bar_chart(surface, &data.labels, &data.values),
            None => Err(ChartError::SurfaceUnavailable(
                "no surface bound".to_string(),
            )),
        };
        self.phase = Phase::Ready;

        let chart = result?;
        self.chart = Some(chart);
        self.resync_at = Some(Instant::now() + RESYNC_DELAY);
        Ok(())
    }

    /// Refit the surface to the container's current geometry and redraw.
    ///
    /// The chart resource is kept; only the surface is resized in place.
    /// Safe to call at arbitrary frequency.
    pub fn on_container_resize(&mut self) -> Result<(), ChartError> {
        if self.phase != Phase::Ready {
            log::warn!("chart resize ignored in phase {:?}", self.phase);
            return Ok(());
        }
        let geometry = self.provider.geometry();
        if let Some(surface) = self.surface.as_mut() {
            surface.fit(&geometry)?;
            if let Some(chart) = self.chart.as_mut() {
                chart.resize(surface)?;
            }
        }
        Ok(())
    }

    /// Drive pending resize notifications and the delayed resync.
    ///
    /// Returns whether the surface was redrawn, so the host knows to
    /// re-upload it.
    pub fn tick(&mut self) -> Result<bool, ChartError> {
        if self.phase != Phase::Ready {
            return Ok(false);
        }
        let mut repainted = false;

        let resized = self
            .resize_rx
            .as_mut()
            .map(|rx| {
                let changed = rx.has_changed().unwrap_or(false);
                if changed {
                    rx.borrow_and_update();
                }
                changed
            })
            .unwrap_or(false);
        if resized {
            self.on_container_resize()?;
            repainted = true;
        }

        if self.resync_at.is_some_and(|at| Instant::now() >= at) {
            self.resync_at = None;
            self.on_container_resize()?;
            if let (Some(chart), Some(surface)) = (self.chart.as_mut(), self.surface.as_mut()) {
                chart.update(surface)?;
            }
            repainted = true;
        }

        Ok(repainted)
    }

    /// Release the chart resource, the resize subscription, and any pending
    /// resync. Terminal and idempotent.
    pub fn destroy(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        if let Some(mut chart) = self.chart.take() {
            chart.destroy();
        }
        self.surface = None;
        self.resize_rx = None;
        self.resync_at = None;
        self.phase = Phase::Destroyed;
    }
}

impl<P: SurfaceProvider, B: RenderBackend> Drop for ChartOrchestrator<P, B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn validate(data: &AggregateSummary) -> Result<(), ChartError> {
    if data.labels.len() != data.values.len() {
        return Err(ChartError::InvalidData(format!(
            "{} labels against {} values",
            data.labels.len(),
            data.values.len()
        )));
    }
    Ok(())
}
