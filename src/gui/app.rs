//! Sales Dashboard Main Application
//! Main window with the global filter panel and the dashboard view.

use crate::data::columns::categorical_columns;
use crate::data::{FilterSelection, LoadReport, LoaderError, SalesRepository};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{AggregateError, Aggregator, DashboardView};
use egui::{Color32, RichText, SidePanel};
use polars::prelude::DataFrame;
use std::sync::Arc;

/// Upper bound on rebuilds while the controls catch up with a new table.
const MAX_SYNC_PASSES: usize = 4;

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

const LOAD_FAILURE_MESSAGE: &str =
    "❌ Failed to load the data files. Please check if all files exist and are accessible.";

/// Main application window.
pub struct DashboardApp {
    repository: SalesRepository,
    aggregator: Aggregator,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    report: Option<Arc<LoadReport>>,
    view: Option<DashboardView>,
    /// Selection or data changed since the last rebuild.
    dirty: bool,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        repository: SalesRepository,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            repository,
            aggregator,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            report: None,
            view: None,
            dirty: true,
        }
    }

    fn selection(&self) -> FilterSelection {
        let selection = FilterSelection::new(self.control_panel.selected_locations());
        match self.chart_viewer.explorer.category_filter() {
            Some(filter) => selection.with_category(filter),
            None => selection,
        }
    }

    /// Fetch the (cached) table and recompute the view for the current selection.
    fn refresh(&mut self) {
        self.dirty = false;
        let report = self.repository.report();
        self.report = Some(Arc::clone(&report));

        let Some(table) = report.table.as_ref() else {
            self.view = None;
            self.control_panel.set_status("Error: no data loaded");
            return;
        };

        match self.rebuild(table) {
            Ok(view) => {
                self.control_panel.set_status(&format!(
                    "{} of {} rows shown",
                    view.explored.height(),
                    table.height()
                ));
                self.view = Some(view);
            }
            Err(e) => {
                log::error!("Failed to aggregate sales data: {e}");
                self.control_panel.set_status(&format!("Error: {e}"));
                self.view = None;
            }
        }
    }

    /// Build the view, then let the controls adopt the table's locations and
    /// columns; rebuild until the selection stops changing.
    fn rebuild(&mut self, table: &DataFrame) -> Result<DashboardView, AggregateError> {
        // The explorer may still point at a column of the previous table.
        self.chart_viewer
            .explorer
            .sync_column(&categorical_columns(table));

        for _ in 0..MAX_SYNC_PASSES {
            let selection = self.selection();
            let view = self.aggregator.build_view(table, &selection)?;

            let locations_changed = self.control_panel.update_locations(&view.locations);
            let column_changed = self
                .chart_viewer
                .explorer
                .sync_column(&view.categorical_columns);
            if !locations_changed && !column_changed {
                self.chart_viewer.explorer.sync_values(&view.category_options);
                if self.selection() == selection {
                    return Ok(view);
                }
            }
        }

        let selection = self.selection();
        self.aggregator.build_view(table, &selection)
    }

    fn show_load_issues(ui: &mut egui::Ui, report: &LoadReport) {
        for issue in &report.issues {
            if matches!(issue, LoaderError::NoData) {
                continue;
            }
            let icon = if issue.is_fatal() { "❌" } else { "⚠" };
            ui.label(RichText::new(format!("{icon} {issue}")).color(ERROR_COLOR));
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dirty {
            self.refresh();
        }

        // Left panel - Global Filters
        SidePanel::left("control_panel")
            .min_width(220.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match self.control_panel.show(ui) {
                    ControlPanelAction::SelectionChanged => self.dirty = true,
                    ControlPanelAction::Reload => {
                        self.repository.invalidate();
                        self.dirty = true;
                    }
                    ControlPanelAction::None => {}
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(
                RichText::new("📊 Sales Analysis Dashboard")
                    .size(26.0)
                    .strong(),
            );
            ui.add_space(10.0);

            if let Some(report) = &self.report {
                Self::show_load_issues(ui, report);
                if !report.has_data() {
                    ui.add_space(10.0);
                    ui.label(
                        RichText::new(LOAD_FAILURE_MESSAGE)
                        .size(16.0)
                        .color(ERROR_COLOR),
                    );
                    return;
                }
            }

            if let Some(view) = &self.view {
                if self.chart_viewer.show(ui, view) {
                    self.dirty = true;
                }
            }
        });

        if self.dirty {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::write_report;
    use crate::data::{DataLoader, SourceSpec};
    use std::fs;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> DashboardApp {
        let palero = write_report(dir, "palero.csv", "Producto,Total\nCafe,100\nTe,50\n");
        DashboardApp {
            repository: SalesRepository::new(DataLoader::new(vec![SourceSpec::new(
                "Palero", palero,
            )])),
            aggregator: Aggregator::default(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            report: None,
            view: None,
            dirty: true,
        }
    }

    #[test]
    fn test_first_refresh_selects_everything() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.refresh();

        let view = app.view.as_ref().unwrap();
        assert_eq!(view.explored.height(), 2);
        assert_eq!(app.control_panel.selected_locations(), vec!["Palero"]);
        assert_eq!(app.chart_viewer.explorer.column.as_deref(), Some("Producto"));
    }

    #[test]
    fn test_reload_recovers_from_vanished_explorer_column() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.refresh();
        app.chart_viewer.explorer.values[0].1 = true;
        app.refresh();
        assert_eq!(app.view.as_ref().unwrap().explored.height(), 1);

        fs::write(dir.path().join("palero.csv"), "Region,Total\nNorte,10\nSur,20\nSur,30\n")
            .unwrap();
        app.repository.invalidate();
        app.refresh();

        let view = app.view.as_ref().unwrap();
        assert_eq!(view.explored.height(), 3);
        assert_eq!(app.chart_viewer.explorer.column.as_deref(), Some("Region"));
        assert_eq!(view.category_options, vec!["Norte", "Sur"]);
    }
}
