//! Sales Dashboard - Multi-location Sales Analysis
//!
//! Loads the per-location sales reports, merges them and shows metrics,
//! charts and a filterable table in a native window.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use data::{DataLoader, SalesRepository};
use eframe::egui;
use gui::DashboardApp;
use stats::Aggregator;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_config()?;
    let loader =
        DataLoader::new(config.source_specs()).with_drop_columns(config.drop_columns.clone());
    let repository = SalesRepository::new(loader);
    let aggregator = Aggregator::new(config.metric_choice());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Sales Analysis Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Sales Analysis Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, repository, aggregator)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the dashboard window: {e}"))
}
