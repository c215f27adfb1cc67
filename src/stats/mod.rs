//! Stats module - aggregation and descriptive statistics

mod aggregator;
mod calculator;

pub use aggregator::{AggregateError, Aggregator, DashboardView, LocationSales, MetricReport};
pub use calculator::GroupStats;
