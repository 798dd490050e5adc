use super::backend::{BarChart, PlottersBackend, RenderBackend};
use super::surface::{ContainerGeometry, PixelSurface};
use super::ChartError;

fn sample_data() -> (Vec<String>, Vec<f64>) {
    (
        vec![
            "DE - Industry".to_string(),
            "UK - Transport".to_string(),
            "FR - Energy".to_string(),
        ],
        vec![30.0, 12.5, 4.0],
    )
}

#[test]
fn renders_bars_into_surface() {
    let mut surface = PixelSurface::new(&ContainerGeometry::new(400.0, 300.0, 1.0)).unwrap();
    let (labels, values) = sample_data();

    let backend = PlottersBackend::default();
    let chart = backend.create_bar_chart(&mut surface, &labels, &values);
    assert!(chart.is_ok());

    // Background was painted and something else was drawn over it.
    let pixels = surface.pixels();
    assert!(pixels.iter().any(|&b| b == 255));
    assert!(pixels.iter().any(|&b| b != 255));
}

#[test]
fn renders_crisp_at_high_pixel_ratio() {
    let mut surface = PixelSurface::new(&ContainerGeometry::new(400.0, 300.0, 2.0)).unwrap();
    assert_eq!(surface.physical_size(), (800, 600));

    let (labels, values) = sample_data();
    let backend = PlottersBackend::default();
    assert!(backend.create_bar_chart(&mut surface, &labels, &values).is_ok());
    assert!(surface.pixels().iter().any(|&b| b != 255));
}

#[test]
fn empty_data_paints_background_only() {
    let mut surface = PixelSurface::new(&ContainerGeometry::new(200.0, 100.0, 1.0)).unwrap();
    let backend = PlottersBackend::default();
    let chart = backend.create_bar_chart(&mut surface, &[], &[]);
    assert!(chart.is_ok());
    assert!(surface.pixels().iter().all(|&b| b == 255));
}

#[test]
fn mismatched_lengths_are_invalid_data() {
    let mut surface = PixelSurface::new(&ContainerGeometry::new(200.0, 100.0, 1.0)).unwrap();
    let backend = PlottersBackend::default();
    let labels = vec!["UK - Transport".to_string(), "DE - Industry".to_string()];
    let err = backend
        .create_bar_chart(&mut surface, &labels, &[1.0])
        .unwrap_err();
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn handle_redraws_after_surface_refit() {
    let mut surface = PixelSurface::new(&ContainerGeometry::new(400.0, 300.0, 1.0)).unwrap();
    let (labels, values) = sample_data();
    let backend = PlottersBackend::default();
    let mut chart = backend
        .create_bar_chart(&mut surface, &labels, &values)
        .unwrap();

    surface
        .fit(&ContainerGeometry::new(640.0, 480.0, 1.5))
        .unwrap();
    assert!(chart.resize(&mut surface).is_ok());
    assert_eq!(surface.physical_size(), (960, 720));
    assert!(surface.pixels().iter().any(|&b| b != 255));
}
