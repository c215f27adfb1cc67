//! Dashboard configuration: which report files to read and how to analyse them.

use crate::data::{MetricChoice, SourceSpec, loader::QUANTITY_COLUMN};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "sales_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One location report.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub path: PathBuf,
}

impl SourceConfig {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory the source paths are relative to.
    pub base_dir: PathBuf,
    /// Location reports, in display order.
    pub sources: Vec<SourceConfig>,
    /// Metric column; the first numeric column when unset.
    pub primary_metric: Option<String>,
    /// Columns removed from the merged table.
    pub drop_columns: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            sources: vec![
                SourceConfig::new(
                    "Palero",
                    "extracted_report_Palero/sales_analysis_Palero_20250121_092409.csv",
                ),
                SourceConfig::new(
                    "Rotonda",
                    "extracted_report_Rotonda/sales_analysis_Rotonda_20250121_092234.csv",
                ),
                SourceConfig::new(
                    "Centro",
                    "extracted_report_Centro/sales_analysis_Centro_20250121_092059.csv",
                ),
            ],
            primary_metric: None,
            drop_columns: vec![QUANTITY_COLUMN.to_string()],
        }
    }
}

impl DashboardConfig {
    /// Parse a config file; a relative `base_dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.base_dir.is_relative() {
            if let Some(dir) = path.parent() {
                config.base_dir = dir.join(&config.base_dir);
            }
        }
        Ok(config)
    }

    /// Sources with paths resolved against `base_dir`.
    pub fn source_specs(&self) -> Vec<SourceSpec> {
        self.sources
            .iter()
            .map(|source| SourceSpec::new(source.name.clone(), self.base_dir.join(&source.path)))
            .collect()
    }

    pub fn metric_choice(&self) -> MetricChoice {
        MetricChoice::from_config(self.primary_metric.as_deref())
    }
}

/// Load configuration.
///
/// Search order:
/// 1. `sales_dashboard.json` next to the executable
/// 2. `sales_dashboard.json` in the working directory
/// 3. Built-in defaults
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join(CONFIG_FILE_NAME));
        }
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));

    for path in candidates {
        if path.exists() {
            log::info!("Loading config from: {}", path.display());
            return DashboardConfig::from_file(&path);
        }
    }

    log::info!("Using default configuration");
    Ok(DashboardConfig::default())
}
