//! Sales Repository Module
//! Owns the loaded sales table and serves it until the report files change.

use super::loader::{DataLoader, LoadReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Identity of one report file on disk at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFingerprint {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: Option<u64>,
}

impl SourceFingerprint {
    fn capture(path: &Path) -> Self {
        let metadata = fs::metadata(path).ok();
        Self {
            path: path.to_path_buf(),
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            len: metadata.as_ref().map(|m| m.len()),
        }
    }
}

struct Snapshot {
    fingerprints: Vec<SourceFingerprint>,
    report: Arc<LoadReport>,
}

/// Memoizing front for [`DataLoader`].
///
/// The first call to [`SalesRepository::report`] runs the loader; later
/// calls share the same immutable report as long as no report file was
/// added, removed or modified.
pub struct SalesRepository {
    loader: DataLoader,
    snapshot: Option<Snapshot>,
}

impl SalesRepository {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            snapshot: None,
        }
    }

    /// Whether a snapshot is held, regardless of whether it is still fresh.
    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Current load report, reloading only when the source files changed.
    pub fn report(&mut self) -> Arc<LoadReport> {
        let fingerprints = self.fingerprints();

        if let Some(snapshot) = &self.snapshot {
            if snapshot.fingerprints == fingerprints {
                return Arc::clone(&snapshot.report);
            }
            log::info!("Sales reports changed on disk, reloading");
        }

        log::info!("Loading {} sales reports", self.loader.sources().len());
        let report = Arc::new(self.loader.load());
        self.snapshot = Some(Snapshot {
            fingerprints,
            report: Arc::clone(&report),
        });
        report
    }

    /// Drop the snapshot so the next [`SalesRepository::report`] reloads.
    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            log::debug!("Sales data cache invalidated");
        }
    }

    fn fingerprints(&self) -> Vec<SourceFingerprint> {
        self.loader
            .sources()
            .iter()
            .map(|source| SourceFingerprint::capture(&source.path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::write_report;
    use crate::data::loader::SourceSpec;
    use std::fs;
    use tempfile::TempDir;

    fn repository(dir: &TempDir) -> SalesRepository {
        let palero = write_report(dir, "palero.csv", "Total\n100\n200\n");
        let rotonda = dir.path().join("rotonda.csv");
        SalesRepository::new(DataLoader::new(vec![
            SourceSpec::new("Palero", palero),
            SourceSpec::new("Rotonda", rotonda),
        ]))
    }

    #[test]
    fn test_second_call_served_from_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);
        assert!(!repo.is_cached());

        let first = repo.report();
        let second = repo.report();

        assert!(repo.is_cached());
        assert!(Arc::ptr_eq(&first, &second));
        let (a, b) = (first.table.as_ref().unwrap(), second.table.as_ref().unwrap());
        assert!(a.equals_missing(b));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);

        let first = repo.report();
        repo.invalidate();
        assert!(!repo.is_cached());
        let second = repo.report();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first
            .table
            .as_ref()
            .unwrap()
            .equals_missing(second.table.as_ref().unwrap()));
    }

    #[test]
    fn test_changed_files_trigger_reload() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);

        let first = repo.report();
        assert_eq!(first.table.as_ref().unwrap().height(), 2);

        fs::write(dir.path().join("rotonda.csv"), "Total\n50\n").unwrap();
        let second = repo.report();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.table.as_ref().unwrap().height(), 3);
        assert!(second.issues.is_empty());
    }

    #[test]
    fn test_rewritten_file_is_served_fresh() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);

        let first = repo.report();
        assert_eq!(first.table.as_ref().unwrap().height(), 2);

        fs::write(dir.path().join("palero.csv"), "Total\n100\n200\n300\n400\n").unwrap();
        let second = repo.report();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.table.as_ref().unwrap().height(), 4);
        assert!(Arc::ptr_eq(&second, &repo.report()));
    }
}
