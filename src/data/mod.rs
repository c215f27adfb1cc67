//! Data module - report loading, caching, filtering and display formatting

pub mod columns;
pub mod filter;
pub mod format;
pub mod loader;
pub mod repository;

pub use columns::MetricChoice;
pub use filter::{CategoryFilter, FilterSelection};
pub use loader::{DataLoader, LoadReport, LoaderError, SourceSpec, LOCATION_COLUMN};
pub use repository::SalesRepository;
