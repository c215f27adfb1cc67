//! Display formatting for tables and metrics.

use super::columns::numeric_columns;
use polars::prelude::*;

/// Insert a comma every three digits of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format an amount as `$1,234.56`. Negative amounts read `-$1,234.56`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.2}", value.abs());
    let (integer, decimals) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };

    format!("{sign}${}.{decimals}", group_thousands(integer))
}

/// Format a statistic rounded to two decimals; NaN renders as `NaN`.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Copy of `df` with every numeric column replaced by its currency text.
///
/// The source frame is left untouched.
pub fn formatted_view(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut view = df.clone();
    for name in numeric_columns(df) {
        let values = df.column(&name)?.cast(&DataType::Float64)?;
        let text: StringChunked = values
            .f64()?
            .into_iter()
            .map(|v| v.map(format_currency))
            .collect();
        view.with_column(text.with_name(name.as_str().into()).into_series())?;
    }
    Ok(view)
}

/// Render one table cell as plain text. Nulls become empty strings.
pub fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(42.0), "$42.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-1234567.891), "-$1,234,567.89");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_format_stat_keeps_nan() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(12.345), "12.35");
    }

    #[test]
    fn test_formatted_view_leaves_source_numeric() {
        let df = df!(
            "Producto" => ["A", "B"],
            "Total" => [Some(1500.0), None],
            "Unidades" => [3i64, 12000]
        )
        .unwrap();

        let view = formatted_view(&df).unwrap();

        let totals: Vec<Option<&str>> = view
            .column("Total")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(totals, vec![Some("$1,500.00"), None]);

        let units = view.column("Unidades").unwrap().get(1).unwrap();
        assert_eq!(cell_text(units), "$12,000.00");
        assert_eq!(cell_text(view.column("Producto").unwrap().get(0).unwrap()), "A");

        assert_eq!(df.column("Total").unwrap().dtype(), &DataType::Float64);
        assert_eq!(view.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_cell_text_null_is_empty() {
        assert_eq!(cell_text(AnyValue::Null), "");
        assert_eq!(cell_text(AnyValue::Int64(7)), "7");
    }
}
