//! Chart Plotter Module
//! Draws the dashboard charts and tables with egui and egui_plot.

use crate::data::format::{cell_text, format_currency, format_stat};
use crate::stats::{GroupStats, LocationSales};
use egui::{Align2, Color32, FontId, Pos2, RichText, Shape, Stroke};
use egui_plot::{Bar, BarChart, Legend, Plot};
use polars::prelude::DataFrame;
use std::f32::consts::TAU;

pub const TOTAL_COLOR: Color32 = Color32::from_rgb(173, 216, 230); // Light blue
pub const AVERAGE_COLOR: Color32 = Color32::from_rgb(0, 0, 139); // Dark blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const BAR_WIDTH: f64 = 0.35;
const PIE_SIZE: f32 = 280.0;
const MAX_TABLE_HEIGHT: f32 = 400.0;
const STATS_HEADERS: [&str; 7] = [
    "Location", "Average", "Median", "Std Dev", "Min", "Max", "Count",
];

/// One pie slice as a fraction of the whole and its angular span in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub share: f64,
    pub start: f32,
    pub end: f32,
}

/// Creates the dashboard visualizations.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn location_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Split a full turn proportionally to `values`. Non-positive values get no slice area.
    pub fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
        let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
        let mut start = 0.0_f32;

        values
            .iter()
            .map(|&v| {
                let share = if total > 0.0 && v > 0.0 { v / total } else { 0.0 };
                let end = start + share as f32 * TAU;
                let slice = PieSlice { share, start, end };
                start = end;
                slice
            })
            .collect()
    }

    /// Grouped bar chart of total and average sales per location.
    pub fn draw_sales_bar_chart(ui: &mut egui::Ui, sales: &[LocationSales]) {
        let labels: Vec<String> = sales.iter().map(|s| s.location.clone()).collect();

        let totals: Vec<Bar> = sales
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64 - BAR_WIDTH / 2.0, s.total)
                    .width(BAR_WIDTH)
                    .name(&s.location)
            })
            .collect();
        let averages: Vec<Bar> = sales
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64 + BAR_WIDTH / 2.0, s.average)
                    .width(BAR_WIDTH)
                    .name(&s.location)
            })
            .collect();

        Plot::new("sales_by_location")
            .height(320.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Location")
            .y_axis_label("Amount ($)")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(totals).name("Total Sales").color(TOTAL_COLOR));
                plot_ui.bar_chart(
                    BarChart::new(averages)
                        .name("Average Sale")
                        .color(AVERAGE_COLOR),
                );
            });
    }

    /// Pie chart of each location's share of total sales, with a legend.
    pub fn draw_sales_pie_chart(ui: &mut egui::Ui, sales: &[LocationSales]) {
        let totals: Vec<f64> = sales.iter().map(|s| s.total).collect();
        let slices = Self::pie_slices(&totals);

        let (response, painter) =
            ui.allocate_painter(egui::vec2(PIE_SIZE, PIE_SIZE), egui::Sense::hover());
        let center = response.rect.center();
        let radius = PIE_SIZE / 2.0 - 10.0;

        for (i, slice) in slices.iter().enumerate() {
            if slice.share <= 0.0 {
                continue;
            }
            let color = Self::location_color(i);
            // Triangle fan: every piece stays convex whatever the slice angle.
            let steps = ((slice.end - slice.start) / 0.05).ceil().max(1.0) as usize;
            let step = (slice.end - slice.start) / steps as f32;
            for s in 0..steps {
                let a0 = slice.start + step * s as f32;
                let a1 = a0 + step;
                painter.add(Shape::convex_polygon(
                    vec![
                        center,
                        Self::on_circle(center, radius, a0),
                        Self::on_circle(center, radius, a1),
                    ],
                    color,
                    Stroke::NONE,
                ));
            }

            let mid = (slice.start + slice.end) / 2.0;
            painter.text(
                Self::on_circle(center, radius * 0.65, mid),
                Align2::CENTER_CENTER,
                format!("{:.1}%", slice.share * 100.0),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        ui.horizontal_wrapped(|ui| {
            for (i, s) in sales.iter().enumerate() {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, Self::location_color(i));
                ui.label(RichText::new(&s.location).size(13.0));
                ui.add_space(10.0);
            }
        });
    }

    /// Angles start at twelve o'clock and run clockwise.
    fn on_circle(center: Pos2, radius: f32, angle: f32) -> Pos2 {
        let theta = angle - TAU / 4.0;
        Pos2::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
    }

    /// Summary statistics table by location.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &[GroupStats]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("location_stats_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in STATS_HEADERS {
                            ui.label(RichText::new(header).strong().size(12.0));
                        }
                        ui.end_row();

                        for gs in stats {
                            ui.label(RichText::new(&gs.location).size(12.0));
                            for value in [gs.mean, gs.median, gs.std, gs.min, gs.max] {
                                ui.label(RichText::new(format_stat(value)).size(12.0));
                            }
                            ui.label(RichText::new(gs.count.to_string()).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }

    /// Scrollable grid of every row of `df`.
    pub fn draw_data_table(ui: &mut egui::Ui, df: &DataFrame) {
        egui::ScrollArea::both()
            .max_height(MAX_TABLE_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                egui::Grid::new("filtered_data_table")
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for name in df.get_column_names() {
                            ui.label(RichText::new(name.as_str()).strong());
                        }
                        ui.end_row();

                        let columns = df.get_columns();
                        for row in 0..df.height() {
                            for column in columns {
                                let text = column.get(row).map(cell_text).unwrap_or_default();
                                ui.label(text);
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Large-number card used for the key metrics row.
    pub fn draw_metric(ui: &mut egui::Ui, label: &str, value: &str) {
        ui.vertical(|ui| {
            ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
            ui.label(RichText::new(value).size(26.0).strong());
        });
    }

    pub fn currency_metric(ui: &mut egui::Ui, label: &str, value: f64) {
        Self::draw_metric(ui, label, &format_currency(value));
    }
}
