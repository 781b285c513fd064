//! Storage interfaces for grid files, plus an in-memory store.
//!
//! File formats live outside this crate: a reader only has to turn a path
//! following the ERA5 naming convention into a [`Dataset`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use era5_common::{era5_file_path, DataLevel, Era5DateTime};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{GridError, Result};

/// Reads stored grid files.
pub trait GridReader: Send + Sync {
    /// Read the dataset at `path`. A missing file is [`GridError::NotFound`].
    fn read(&self, path: &Path) -> Result<Dataset>;

    fn exists(&self, path: &Path) -> bool;
}

/// Writes grid files under the naming convention.
pub trait GridWriter: Send + Sync {
    /// Write `dataset` below `dir` at the path derived from its first
    /// instant, returning that path.
    fn write(&self, dataset: &Dataset, dir: &Path, level: DataLevel) -> Result<PathBuf>;
}

/// A store that can both read and write.
pub trait GridStore: GridReader + GridWriter {}

impl<T: GridReader + GridWriter> GridStore for T {}

/// Upstream reanalysis archive, used only by ingestion.
pub trait ReanalysisSource: Send + Sync {
    /// Read `variables` on the full grid at one calendar instant.
    fn read(&self, variables: &[String], instant: &Era5DateTime) -> Result<Dataset>;
}

/// Path a dataset is written to.
pub fn output_path(dataset: &Dataset, dir: &Path, level: DataLevel) -> Result<PathBuf> {
    let instant = dataset
        .time
        .first()
        .ok_or_else(|| GridError::invalid_query("cannot name a dataset without a time axis"))?;
    Ok(era5_file_path(dir, instant, level))
}

/// Grid files held in memory, keyed by path.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<PathBuf, Dataset>>,
    reads: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Dataset>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Dataset>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `dataset` at an explicit path.
    pub fn insert(&self, path: impl Into<PathBuf>, dataset: Dataset) {
        self.files_mut().insert(path.into(), dataset);
    }

    /// Number of successful reads so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Stored paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

impl GridReader for MemoryStore {
    fn read(&self, path: &Path) -> Result<Dataset> {
        let dataset = self
            .files()
            .get(path)
            .cloned()
            .ok_or_else(|| GridError::NotFound(path.to_path_buf()))?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(dataset)
    }

    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }
}

impl GridWriter for MemoryStore {
    fn write(&self, dataset: &Dataset, dir: &Path, level: DataLevel) -> Result<PathBuf> {
        let path = output_path(dataset, dir, level)?;
        debug!(path = %path.display(), bytes = dataset.nbytes(), "Writing dataset");
        self.insert(path.clone(), dataset.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![Era5DateTime::tavg(1, 15, 6).unwrap()],
            vec![1000.0],
            vec![0.0],
            vec![0.0],
        )
    }

    #[test]
    fn test_write_then_read() {
        let store = MemoryStore::new();
        let path = store
            .write(&dataset(), Path::new("/data"), DataLevel::Hour)
            .unwrap();
        assert_eq!(path, PathBuf::from("/data/hourly/ERA5-tavg-0115-0600.nc"));
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), dataset());
        assert_eq!(store.read_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let store = MemoryStore::new();
        let err = store.read(Path::new("/nowhere.nc")).unwrap_err();
        assert!(matches!(err, GridError::NotFound(p) if p == Path::new("/nowhere.nc")));
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_write_requires_time() {
        let store = MemoryStore::new();
        let empty = Dataset::new(vec![], vec![], vec![], vec![]);
        assert!(store.write(&empty, Path::new("/data"), DataLevel::Day).is_err());
        assert!(store.is_empty());
    }
}
