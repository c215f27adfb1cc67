//! Aggregator Module
//! Turns the unified sales table and the current selection into the
//! metrics, chart series and tables shown on the dashboard.

use super::calculator::{GroupStats, StatsCalculator};
use crate::data::columns::{categorical_columns, distinct_values, MetricChoice};
use crate::data::filter::{apply_category_filter, filter_by_locations, FilterSelection};
use crate::data::format::formatted_view;
use crate::data::LOCATION_COLUMN;
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{0} is not a categorical column")]
    NotCategorical(String),
}

/// Headline numbers over the location-filtered rows.
///
/// `total` and `average` are `None` when there is nothing to summarise.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total: Option<f64>,
    pub average: Option<f64>,
    pub locations: usize,
}

/// Bar and pie chart series for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSales {
    pub location: String,
    pub total: f64,
    pub average: f64,
}

/// Everything derived from the primary metric.
#[derive(Debug, Clone)]
pub struct MetricReport {
    pub column: String,
    pub summary: SummaryMetrics,
    pub sales_by_location: Vec<LocationSales>,
    pub location_stats: Vec<GroupStats>,
}

/// Output of one dashboard interaction.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Distinct locations of the whole table, for the location selector.
    pub locations: Vec<String>,
    /// Columns offered by the data explorer filter.
    pub categorical_columns: Vec<String>,
    /// `None` when the table has no usable metric column.
    pub metric: Option<MetricReport>,
    /// Rows of the selected locations.
    pub located: DataFrame,
    /// Values of the explorer column present in `located`.
    pub category_options: Vec<String>,
    /// `located` narrowed by the explorer filter.
    pub explored: DataFrame,
    /// `explored` with numeric columns rendered as currency.
    pub formatted: DataFrame,
}

/// Stateless aggregation over a borrowed table.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    metric: MetricChoice,
}

impl Aggregator {
    pub fn new(metric: MetricChoice) -> Self {
        Self { metric }
    }

    /// Run the whole pipeline for one selection.
    ///
    /// Metrics, charts and statistics use the location-filtered rows; the
    /// category filter only narrows the explorer table.
    pub fn build_view(
        &self,
        table: &DataFrame,
        selection: &FilterSelection,
    ) -> Result<DashboardView, AggregateError> {
        let locations = distinct_values(table, LOCATION_COLUMN)?;
        let categorical = categorical_columns(table);
        let located = filter_by_locations(table, &selection.locations)?;

        let metric = match self.metric.resolve(table) {
            Some(column) => {
                let selected = selection
                    .distinct_locations()
                    .into_iter()
                    .filter(|loc| locations.iter().any(|known| known.as_str() == *loc))
                    .count();
                Some(Self::metric_report(&located, column, selected)?)
            }
            None => None,
        };

        // A filter left on a column the table no longer offers is ignored
        // unless it still selects values.
        let category = match &selection.category {
            Some(filter) if !categorical.contains(&filter.column) => {
                if filter.is_active() {
                    return Err(AggregateError::NotCategorical(filter.column.clone()));
                }
                None
            }
            other => other.as_ref(),
        };
        let category_options = match category {
            Some(filter) => distinct_values(&located, &filter.column)?,
            None => Vec::new(),
        };

        let explored = apply_category_filter(&located, category)?;
        let formatted = formatted_view(&explored)?;

        Ok(DashboardView {
            locations,
            categorical_columns: categorical,
            metric,
            located,
            category_options,
            explored,
            formatted,
        })
    }

    fn metric_report(
        df: &DataFrame,
        column: String,
        locations: usize,
    ) -> Result<MetricReport, AggregateError> {
        let summary = Self::summary(df, &column, locations)?;
        let sales_by_location = Self::sales_by_location(df, &column)?;
        let groups = Self::values_by_location(df, &column)?;
        let location_stats = StatsCalculator::compute_location_stats(&groups);

        Ok(MetricReport {
            column,
            summary,
            sales_by_location,
            location_stats,
        })
    }

    /// Non-null metric values as `f64`, in row order.
    fn metric_values(df: &DataFrame, metric: &str) -> PolarsResult<Vec<f64>> {
        let values = df.column(metric)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().flatten().collect())
    }

    /// Total and average of the metric, plus the number of selected locations.
    pub fn summary(
        df: &DataFrame,
        metric: &str,
        locations: usize,
    ) -> PolarsResult<SummaryMetrics> {
        if df.height() == 0 {
            return Ok(SummaryMetrics {
                total: None,
                average: None,
                locations,
            });
        }

        let values = Self::metric_values(df, metric)?;
        let total = values.iter().sum::<f64>();
        let average = if values.is_empty() {
            None
        } else {
            Some(total / values.len() as f64)
        };

        Ok(SummaryMetrics {
            total: Some(total),
            average,
            locations,
        })
    }

    /// Sum and mean of the metric per location, in order of first appearance.
    pub fn sales_by_location(df: &DataFrame, metric: &str) -> PolarsResult<Vec<LocationSales>> {
        let value = col(metric).cast(DataType::Float64);
        let grouped = df
            .clone()
            .lazy()
            .group_by_stable([col(LOCATION_COLUMN)])
            .agg([
                value.clone().sum().alias("total"),
                value.mean().alias("average"),
            ])
            .collect()?;

        let location_col = grouped.column(LOCATION_COLUMN)?;
        let locations = location_col.as_materialized_series().str()?;
        let totals = grouped.column("total")?.f64()?;
        let averages = grouped.column("average")?.f64()?;

        Ok(locations
            .into_iter()
            .zip(totals)
            .zip(averages)
            .map(|((location, total), average)| LocationSales {
                location: location.unwrap_or_default().to_string(),
                total: total.unwrap_or(0.0),
                average: average.unwrap_or(f64::NAN),
            })
            .collect())
    }

    /// Metric values bucketed by location, in order of first appearance.
    ///
    /// A location whose metric cells are all null still gets an empty bucket.
    pub fn values_by_location(
        df: &DataFrame,
        metric: &str,
    ) -> PolarsResult<Vec<(String, Vec<f64>)>> {
        let location_col = df.column(LOCATION_COLUMN)?;
        let locations = location_col.as_materialized_series().str()?;
        let values = df.column(metric)?.cast(&DataType::Float64)?;

        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for (location, value) in locations.into_iter().zip(values.f64()?) {
            let Some(location) = location else {
                continue;
            };
            let slot = *index.entry(location).or_insert_with(|| {
                groups.push((location.to_string(), Vec::new()));
                groups.len() - 1
            });
            if let Some(v) = value {
                groups[slot].1.push(v);
            }
        }

        Ok(groups)
    }
}
