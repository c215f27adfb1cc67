//! CSV Data Loader Module
//! Reads the per-location sales reports with Polars and merges them into one table.

use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column injected into every row with the name of its source location.
pub const LOCATION_COLUMN: &str = "Location";

/// Quantity column carried by the reports but irrelevant to the analysis.
pub const QUANTITY_COLUMN: &str = "Cantidad";

const INFER_SCHEMA_ROWS: usize = 10_000;

/// What went wrong while reading a report that does exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The file could not be opened or read.
    Access,
    /// The file was read but its contents are not a valid table.
    Parse,
}

impl FaultKind {
    fn of(cause: &PolarsError) -> Self {
        match cause {
            PolarsError::IO { .. } => FaultKind::Access,
            PolarsError::Context { error, .. } => FaultKind::of(error),
            _ => FaultKind::Parse,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Access => f.write_str("access error"),
            FaultKind::Parse => f.write_str("parse error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found for {location}: {}", .path.display())]
    MissingSourceFile { location: String, path: PathBuf },
    #[error("Error loading {location} data from {} ({kind}): {cause}", .path.display())]
    LoadFault {
        location: String,
        path: PathBuf,
        kind: FaultKind,
        #[source]
        cause: PolarsError,
    },
    #[error("Failed to merge location reports: {0}")]
    MergeFault(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

impl LoaderError {
    fn load_fault(source: &SourceSpec, cause: PolarsError) -> Self {
        let kind = FaultKind::of(&cause);
        LoaderError::LoadFault {
            location: source.location.clone(),
            path: source.path.clone(),
            kind,
            cause,
        }
    }

    /// Whether this issue wipes out the whole load attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoaderError::MissingSourceFile { .. })
    }
}

/// A named location and the report file that holds its sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub location: String,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(location: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            path: path.into(),
        }
    }
}

/// Outcome of one load attempt.
///
/// `table` is `None` when nothing could be loaded; `issues` lists every
/// problem met on the way, including the non-fatal missing files.
#[derive(Debug)]
pub struct LoadReport {
    pub table: Option<DataFrame>,
    pub issues: Vec<LoaderError>,
}

impl LoadReport {
    pub fn has_data(&self) -> bool {
        self.table.is_some()
    }

    fn failed(issues: Vec<LoaderError>) -> Self {
        Self {
            table: None,
            issues,
        }
    }
}

/// Reads a fixed set of location reports into one unified table.
#[derive(Debug, Clone)]
pub struct DataLoader {
    sources: Vec<SourceSpec>,
    drop_columns: Vec<String>,
}

impl DataLoader {
    pub fn new(sources: Vec<SourceSpec>) -> Self {
        Self {
            sources,
            drop_columns: vec![QUANTITY_COLUMN.to_string()],
        }
    }

    /// Replace the set of columns removed from the unified table.
    pub fn with_drop_columns(mut self, drop_columns: Vec<String>) -> Self {
        self.drop_columns = drop_columns;
        self
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// Load every source, skipping missing files.
    ///
    /// Never fails: a read fault on any existing file, or the absence of
    /// all files, produces a report without a table.
    pub fn load(&self) -> LoadReport {
        let mut issues = Vec::new();
        let mut frames = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            if !source.path.exists() {
                let issue = LoaderError::MissingSourceFile {
                    location: source.location.clone(),
                    path: source.path.clone(),
                };
                log::error!("{issue}");
                issues.push(issue);
                continue;
            }

            match Self::read_source(source) {
                Ok(df) => {
                    log::info!(
                        "Loaded {} rows for {} from {}",
                        df.height(),
                        source.location,
                        source.path.display()
                    );
                    frames.push(df);
                }
                Err(issue) => {
                    log::error!("{issue}");
                    issues.push(issue);
                    return LoadReport::failed(issues);
                }
            }
        }

        if frames.is_empty() {
            log::error!("No location report could be loaded");
            issues.push(LoaderError::NoData);
            return LoadReport::failed(issues);
        }

        match self.combine(frames) {
            Ok(df) => LoadReport {
                table: Some(df),
                issues,
            },
            Err(issue) => {
                log::error!("{issue}");
                issues.push(issue);
                LoadReport::failed(issues)
            }
        }
    }

    /// Read one report and tag its rows with the location name.
    fn read_source(source: &SourceSpec) -> Result<DataFrame, LoaderError> {
        Self::read_csv(&source.path)
            .and_then(|lf| {
                lf.with_column(lit(source.location.as_str()).alias(LOCATION_COLUMN))
                    .collect()
            })
            .map_err(|cause| LoaderError::load_fault(source, cause))
    }

    fn read_csv(path: &Path) -> PolarsResult<LazyFrame> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .finish()
    }

    /// Concatenate per-location tables in source order and drop ignored columns.
    fn combine(&self, frames: Vec<DataFrame>) -> Result<DataFrame, LoaderError> {
        let lazy: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };
        let mut df = concat_lf_diagonal(lazy, args)?.collect()?;

        for name in &self.drop_columns {
            if df.get_column_index(name).is_some() {
                df.drop_in_place(name)?;
                log::debug!("Dropped column {name} from unified table");
            }
        }

        Ok(df)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn write_report(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub(crate) fn location_values(df: &DataFrame) -> Vec<String> {
        df.column(LOCATION_COLUMN)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_tags_and_concatenates_in_source_order() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Producto,Total\nA,100\nB,200\n");
        let rotonda = write_report(&dir, "rotonda.csv", "Producto,Total\nC,50\n");

        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Rotonda", rotonda),
        ]);
        let report = loader.load();

        assert!(report.issues.is_empty());
        let df = report.table.unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(location_values(&df), vec!["Palero", "Palero", "Rotonda"]);

        let products: Vec<&str> = df
            .column("Producto")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(products, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Total\n10\n20\n");

        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Centro", dir.path().join("missing.csv")),
        ]);
        let report = loader.load();

        assert!(report.has_data());
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(
            &report.issues[0],
            LoaderError::MissingSourceFile { location, .. } if location == "Centro"
        ));
        assert!(!report.issues[0].is_fatal());
        assert_eq!(location_values(report.table.as_ref().unwrap()), vec!["Palero", "Palero"]);
    }

    #[test]
    fn test_no_sources_loaded_is_no_data() {
        let dir = TempDir::new().unwrap();
        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", dir.path().join("a.csv")),
            SourceSpec::new("Rotonda", dir.path().join("b.csv")),
        ]);
        let report = loader.load();

        assert!(!report.has_data());
        assert_eq!(report.issues.len(), 3);
        assert!(matches!(report.issues.last(), Some(LoaderError::NoData)));
    }

    #[test]
    fn test_quantity_column_dropped_from_any_source() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Producto,Cantidad,Total\nA,2,100\n");
        let rotonda = write_report(&dir, "rotonda.csv", "Producto,Total\nB,40\n");

        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Rotonda", rotonda),
        ]);
        let df = loader.load().table.unwrap();

        assert!(df.get_column_index(QUANTITY_COLUMN).is_none());
        assert!(df.get_column_index("Total").is_some());
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_heterogeneous_columns_are_unioned() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Total,Categoria\n100,Bebidas\n");
        let rotonda = write_report(&dir, "rotonda.csv", "Total\n50.5\n");

        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Rotonda", rotonda),
        ]);
        let df = loader.load().table.unwrap();

        assert_eq!(df.height(), 2);
        let categories = df.column("Categoria").unwrap();
        assert_eq!(categories.null_count(), 1);
        let totals = df.column("Total").unwrap();
        assert_eq!(totals.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_malformed_file_degrades_to_no_data() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Total\n10\n");
        let broken = write_report(&dir, "broken.csv", "a,b\n1,2,3,4\n\"unterminated\n");

        let loader = DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Rotonda", broken),
        ]);
        let report = loader.load();

        assert!(!report.has_data());
        assert!(matches!(
            report.issues.last(),
            Some(LoaderError::LoadFault { location, kind: FaultKind::Parse, .. })
                if location == "Rotonda"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_access_fault() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = write_report(&dir, "centro.csv", "Total\n10\n");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // Permission bits are not enforced (running as root).
            return;
        }

        let report = DataLoader::new(vec![SourceSpec::new("Centro", locked.clone())]).load();

        assert!(!report.has_data());
        let issue = report.issues.last().unwrap();
        assert!(matches!(
            issue,
            LoaderError::LoadFault { kind: FaultKind::Access, .. }
        ));
        assert!(issue.is_fatal());
        assert!(issue.to_string().contains("access error"));
    }

    #[test]
    fn test_custom_drop_columns() {
        let dir = TempDir::new().unwrap();
        let palero = write_report(&dir, "palero.csv", "Total,Notas\n10,x\n");

        let loader = DataLoader::new(vec![SourceSpec::new("Palero", palero)])
            .with_drop_columns(vec!["Notas".to_string()]);
        let df = loader.load().table.unwrap();

        assert!(df.get_column_index("Notas").is_none());
    }
}
