use std::sync::Arc;

use tokio::sync::watch;

use super::ChartError;

/// Layout box of the chart container plus the environment's pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerGeometry {
    /// Container width in logical pixels
    pub width: f32,
    /// Container height in logical pixels
    pub height: f32,
    /// Scale factor between logical and physical pixels
    pub pixel_ratio: f32,
}

impl ContainerGeometry {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Pixel ratio with degenerate values (zero, negative, non-finite)
    /// falling back to 1.0.
    pub fn effective_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    /// Physical pixel dimensions of a surface covering this box.
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.effective_ratio();
        (
            (self.width.max(0.0) * ratio).floor() as u32,
            (self.height.max(0.0) * ratio).floor() as u32,
        )
    }
}

/// An owned RGB pixel buffer the chart renders into.
///
/// Sized to the container's layout box times the device pixel ratio, so the
/// rendered output stays crisp on high-density displays. Refitting reuses the
/// same allocation object; only the buffer length changes with geometry.
#[derive(Debug)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a surface for `geometry`, or [`ChartError::SurfaceUnavailable`]
    /// when the container has no drawable area.
    pub fn new(geometry: &ContainerGeometry) -> Result<Self, ChartError> {
        let mut surface = Self {
            width: 0,
            height: 0,
            pixel_ratio: 1.0,
            pixels: Vec::new(),
        };
        surface.fit(geometry)?;
        Ok(surface)
    }

    /// Refit the buffer to a new geometry in place.
    pub fn fit(&mut self, geometry: &ContainerGeometry) -> Result<(), ChartError> {
        let (width, height) = geometry.physical_size();
        if width == 0 || height == 0 {
            return Err(ChartError::SurfaceUnavailable(format!(
                "container has no drawable area ({width}x{height} px)"
            )));
        }
        self.width = width;
        self.height = height;
        self.pixel_ratio = geometry.effective_ratio();
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 3, 0);
        Ok(())
    }

    /// Physical pixel dimensions of the buffer.
    pub fn physical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Logical size of the surface in layout pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.width as f32 / self.pixel_ratio,
            self.height as f32 / self.pixel_ratio,
        )
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// The RGB pixel data, row-major, three bytes per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for the rendering backend.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

/// Supplies drawing surfaces, container geometry, and resize notifications.
pub trait SurfaceProvider {
    /// Current layout box and pixel ratio of the chart container.
    fn geometry(&self) -> ContainerGeometry;

    /// Produce a surface covering the current geometry.
    fn create_surface(&self) -> Result<PixelSurface, ChartError> {
        PixelSurface::new(&self.geometry())
    }

    /// Subscribe to container resize notifications.
    fn subscribe_resize(&self) -> watch::Receiver<ContainerGeometry>;
}

/// Production surface provider, fed the container's geometry by the UI.
///
/// Geometry goes through a watch channel: subscribers only ever observe the
/// latest value, so rapid resize bursts coalesce instead of queueing.
#[derive(Clone)]
pub struct ContainerHandle {
    geometry: Arc<watch::Sender<ContainerGeometry>>,
}

impl ContainerHandle {
    pub fn new(initial: ContainerGeometry) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            geometry: Arc::new(tx),
        }
    }

    /// Publish the container's current geometry; unchanged values notify nobody.
    pub fn set_geometry(&self, geometry: ContainerGeometry) {
        self.geometry.send_if_modified(|current| {
            if *current == geometry {
                false
            } else {
                *current = geometry;
                true
            }
        });
    }
}

impl SurfaceProvider for ContainerHandle {
    fn geometry(&self) -> ContainerGeometry {
        *self.geometry.borrow()
    }

    fn subscribe_resize(&self) -> watch::Receiver<ContainerGeometry> {
        self.geometry.subscribe()
    }
}
