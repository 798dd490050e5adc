//! Emissions Dashboard
//!
//! A GUI application for exploring and visualizing greenhouse-gas emission
//! records.

use std::sync::{Arc, Mutex};

use eframe::egui;
use tokio::runtime::Runtime;

use ghgstats::app::{App, AppWrapper, ChartPanel};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The UI runs inside the runtime so spawned fetch tasks have a reactor.
    let rt = Runtime::new()?;
    rt.block_on(async {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1200.0, 800.0])
                .with_min_inner_size([800.0, 600.0])
                .with_title("Emissions Dashboard"),
            ..Default::default()
        };

        let app: Arc<Mutex<App>> = Arc::new(Mutex::new(App::default()));
        eframe::run_native(
            "Emissions Dashboard",
            options,
            Box::new(|_cc| {
                Ok(Box::new(AppWrapper {
                    app,
                    chart_panel: ChartPanel::new(),
                }) as Box<dyn eframe::App>)
            }),
        )
        .map_err(|e| anyhow::anyhow!("error running application: {e}"))
    })
}
