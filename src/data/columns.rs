//! Column discovery for the unified sales table.

use super::loader::LOCATION_COLUMN;
use polars::prelude::*;

/// Check whether a column holds numeric values.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Numeric column names, in column order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Text columns usable as a secondary filter. `Location` is excluded.
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String && col.name().as_str() != LOCATION_COLUMN)
        .map(|col| col.name().to_string())
        .collect()
}

/// Non-null distinct values of a column, in order of first appearance.
pub fn distinct_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let as_text = df.column(column)?.cast(&DataType::String)?;
    let unique = as_text.as_materialized_series().unique_stable()?;
    Ok(unique
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// How the primary metric column is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MetricChoice {
    /// Use the first numeric column of the table.
    #[default]
    FirstNumeric,
    /// Use this column, provided it exists and is numeric.
    Named(String),
}

impl MetricChoice {
    pub fn from_config(name: Option<&str>) -> Self {
        match name {
            Some(name) => MetricChoice::Named(name.to_string()),
            None => MetricChoice::FirstNumeric,
        }
    }

    /// Resolve to a column of `df`, or `None` when no suitable column exists.
    pub fn resolve(&self, df: &DataFrame) -> Option<String> {
        match self {
            MetricChoice::FirstNumeric => numeric_columns(df).into_iter().next(),
            MetricChoice::Named(name) => {
                let column = df.column(name).ok()?;
                if is_numeric_dtype(column.dtype()) {
                    Some(name.clone())
                } else {
                    log::warn!("Configured metric column {name} is not numeric");
                    None
                }
            }
        }
    }
}
