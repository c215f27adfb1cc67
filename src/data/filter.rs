//! Row filters driven by the dashboard selection controls.

use super::loader::LOCATION_COLUMN;
use polars::prelude::*;
use std::collections::HashSet;

/// Secondary filter on one categorical column.
///
/// An empty `values` list means "no filter" (every row passes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub column: String,
    pub values: Vec<String>,
}

impl CategoryFilter {
    pub fn new(column: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            column: column.into(),
            values,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Everything the user picked on the dashboard for one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub locations: Vec<String>,
    pub category: Option<CategoryFilter>,
}

impl FilterSelection {
    pub fn new(locations: Vec<String>) -> Self {
        Self {
            locations,
            category: None,
        }
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = Some(category);
        self
    }

    /// Selected locations without duplicates, in selection order.
    pub fn distinct_locations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.locations
            .iter()
            .map(String::as_str)
            .filter(|loc| seen.insert(*loc))
            .collect()
    }
}

/// Keep rows whose `Location` is selected. No selection keeps no rows.
pub fn filter_by_locations(df: &DataFrame, locations: &[String]) -> PolarsResult<DataFrame> {
    filter_by_values(df, LOCATION_COLUMN, locations)
}

/// Apply the secondary filter; inactive or absent filters pass every row through.
pub fn apply_category_filter(
    df: &DataFrame,
    filter: Option<&CategoryFilter>,
) -> PolarsResult<DataFrame> {
    match filter {
        Some(filter) if filter.is_active() => filter_by_values(df, &filter.column, &filter.values),
        _ => Ok(df.clone()),
    }
}

/// Keep rows whose `column` value (as text) is one of `values`. Nulls never match.
fn filter_by_values(df: &DataFrame, column: &str, values: &[String]) -> PolarsResult<DataFrame> {
    let allowed: HashSet<&str> = values.iter().map(String::as_str).collect();
    let as_text = df.column(column)?.cast(&DataType::String)?;
    let mask: BooleanChunked = as_text
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|value| value.is_some_and(|v| allowed.contains(v)))
        .collect();
    df.filter(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Categoria" => [
                Some("Bebidas"),
                Some("Comida"),
                None,
                Some("Bebidas"),
                Some("Postres")
            ],
            "Total" => [100.0, 120.0, 80.0, 90.0, 60.0],
            "Location" => ["Palero", "Palero", "Palero", "Rotonda", "Rotonda"]
        )
        .unwrap()
    }

    fn all_locations() -> Vec<String> {
        vec!["Palero".to_string(), "Rotonda".to_string()]
    }

    #[test]
    fn test_all_locations_is_identity() {
        let df = sample();
        let filtered = filter_by_locations(&df, &all_locations()).unwrap();
        assert!(filtered.equals_missing(&df));
    }

    #[test]
    fn test_no_locations_keeps_schema_but_no_rows() {
        let df = sample();
        let filtered = filter_by_locations(&df, &[]).unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.schema(), df.schema());
    }

    #[test]
    fn test_single_location() {
        let filtered = filter_by_locations(&sample(), &["Rotonda".to_string()]).unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn test_empty_category_selection_passes_through() {
        let df = sample();
        let filter = CategoryFilter::new("Categoria", Vec::new());
        let filtered = apply_category_filter(&df, Some(&filter)).unwrap();
        assert!(filtered.equals_missing(&df));

        let unfiltered = apply_category_filter(&df, None).unwrap();
        assert!(unfiltered.equals_missing(&df));
    }

    #[test]
    fn test_category_selection_drops_nulls_and_others() {
        let filter = CategoryFilter::new("Categoria", vec!["Bebidas".to_string()]);
        let filtered = apply_category_filter(&sample(), Some(&filter)).unwrap();
        assert_eq!(filtered.height(), 2);

        let totals: Vec<f64> = filtered
            .column("Total")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(totals, vec![100.0, 90.0]);
    }

    #[test]
    fn test_filters_combine() {
        let located = filter_by_locations(&sample(), &["Palero".to_string()]).unwrap();
        let filter = CategoryFilter::new("Categoria", vec!["Bebidas".into(), "Postres".into()]);
        let filtered = apply_category_filter(&located, Some(&filter)).unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn test_distinct_locations_dedups() {
        let selection = FilterSelection::new(vec![
            "Palero".into(),
            "Centro".into(),
            "Palero".into(),
        ]);
        assert_eq!(selection.distinct_locations(), vec!["Palero", "Centro"]);
    }
}
