//! Chart Viewer Widget
//! Central panel: key metrics, chart tabs and the data explorer.

use crate::charts::ChartPlotter;
use crate::data::CategoryFilter;
use crate::stats::{DashboardView, MetricReport};
use egui::{ComboBox, RichText, ScrollArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    SalesAnalysis,
    DetailedComparison,
}

/// State of the "Advanced Data Explorer" filter.
#[derive(Debug, Clone, Default)]
pub struct ExplorerState {
    pub column: Option<String>,
    /// Offered values and whether each is selected.
    pub values: Vec<(String, bool)>,
}

impl ExplorerState {
    /// Secondary filter for the current choice; `None` until a column is picked.
    pub fn category_filter(&self) -> Option<CategoryFilter> {
        let column = self.column.as_ref()?;
        let values = self
            .values
            .iter()
            .filter(|(_, selected)| *selected)
            .map(|(value, _)| value.clone())
            .collect();
        Some(CategoryFilter::new(column.clone(), values))
    }

    /// Keep the column valid for `columns`, defaulting to the first one.
    ///
    /// Returns `true` when the column changed.
    pub fn sync_column(&mut self, columns: &[String]) -> bool {
        let valid = self
            .column
            .as_ref()
            .is_some_and(|c| columns.contains(c));
        if valid {
            return false;
        }
        let next = columns.first().cloned();
        let changed = next != self.column;
        self.column = next;
        self.values.clear();
        changed
    }

    /// Refresh the offered values, keeping selections that are still present.
    pub fn sync_values(&mut self, options: &[String]) {
        self.values = options
            .iter()
            .map(|value| {
                let selected = self
                    .values
                    .iter()
                    .any(|(old, selected)| old == value && *selected);
                (value.clone(), selected)
            })
            .collect();
    }
}

/// Scrollable central area showing one [`DashboardView`].
#[derive(Default)]
pub struct ChartViewer {
    pub tab: Tab,
    pub explorer: ExplorerState,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the dashboard; returns `true` when the explorer filter changed.
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView) -> bool {
        let mut changed = false;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(metric) = &view.metric {
                    Self::show_metrics(ui, metric);
                    ui.add_space(15.0);
                    self.show_tabs(ui, metric);
                    ui.add_space(15.0);
                }
                changed = self.show_explorer(ui, view);
            });

        changed
    }

    fn show_metrics(ui: &mut egui::Ui, metric: &MetricReport) {
        ui.label(RichText::new("📈 Key Metrics").size(18.0).strong());
        ui.add_space(8.0);

        let summary = &metric.summary;
        let (Some(total), Some(average)) = (summary.total, summary.average) else {
            return;
        };

        ui.columns(3, |cols| {
            ChartPlotter::currency_metric(&mut cols[0], "Total Sales", total);
            ChartPlotter::currency_metric(&mut cols[1], "Average Sales", average);
            ChartPlotter::draw_metric(
                &mut cols[2],
                "Locations Analyzed",
                &summary.locations.to_string(),
            );
        });
    }

    fn show_tabs(&mut self, ui: &mut egui::Ui, metric: &MetricReport) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, Tab::SalesAnalysis, "📊 Sales Analysis");
            ui.selectable_value(&mut self.tab, Tab::DetailedComparison, "🔍 Detailed Comparison");
        });
        ui.separator();

        match self.tab {
            Tab::SalesAnalysis => {
                ui.label(RichText::new("Sales Distribution by Location").size(16.0).strong());
                ui.add_space(5.0);
                ChartPlotter::draw_sales_bar_chart(ui, &metric.sales_by_location);
            }
            Tab::DetailedComparison => {
                ui.label(RichText::new("Location Performance Comparison").size(16.0).strong());
                ui.add_space(5.0);
                ui.columns(2, |cols| {
                    cols[0].label("📊 Summary Statistics by Location");
                    ChartPlotter::draw_stats_table(&mut cols[0], &metric.location_stats);

                    cols[1].label("Sales Distribution by Location");
                    ChartPlotter::draw_sales_pie_chart(&mut cols[1], &metric.sales_by_location);
                });
            }
        }
    }

    fn show_explorer(&mut self, ui: &mut egui::Ui, view: &DashboardView) -> bool {
        let mut changed = false;

        ui.label(RichText::new("🔍 Advanced Data Explorer").size(18.0).strong());
        ui.add_space(8.0);

        if !view.categorical_columns.is_empty() {
            let current = self.explorer.column.clone().unwrap_or_default();
            ui.horizontal(|ui| {
                ui.label("Filter by:");
                ComboBox::from_id_salt("explorer_column")
                    .width(180.0)
                    .selected_text(&current)
                    .show_ui(ui, |ui| {
                        for column in &view.categorical_columns {
                            if ui.selectable_label(current == *column, column).clicked()
                                && current != *column
                            {
                                self.explorer.column = Some(column.clone());
                                self.explorer.values.clear();
                                changed = true;
                            }
                        }
                    });
            });

            ui.label("Select values:");
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("explorer_values")
                        .max_height(120.0)
                        .show(ui, |ui| {
                            ui.horizontal_wrapped(|ui| {
                                for (value, selected) in &mut self.explorer.values {
                                    if ui.checkbox(selected, value.as_str()).changed() {
                                        changed = true;
                                    }
                                }
                            });
                        });
                });
            ui.add_space(10.0);
        }

        if view.formatted.height() > 0 {
            ui.label("📋 Filtered Data:");
            ChartPlotter::draw_data_table(ui, &view.formatted);
        }

        changed
    }
}
