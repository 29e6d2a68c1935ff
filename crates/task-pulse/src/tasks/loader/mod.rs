//! Loading collaborator: reads task sheets from disk, normalizes them and caches the
//! result in an injected [`TaskSetStore`].

mod delimited;
mod spreadsheet;

use super::domain::TaskSet;
use super::schema::{normalize, NormalizeError};
use super::store::TaskSetStore;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity of a task source; the cache key for loaded task sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SourceId(PathBuf);

impl SourceId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited(u8),
    Spreadsheet,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(Self::Delimited(b',')),
            "tsv" | "tab" => Some(Self::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("task source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported task source format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("failed to read task source: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid delimited task data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no worksheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub struct TaskLoader<S> {
    store: Arc<S>,
}

impl<S: TaskSetStore> TaskLoader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the cached task set for `source`, reading and normalizing the file on
    /// first use. Failures are not cached.
    pub fn load_tasks(&self, source: &SourceId) -> Result<Arc<TaskSet>, LoadError> {
        if let Some(cached) = self.store.get(source) {
            debug!(%source, "task set served from cache");
            return Ok(cached);
        }

        match read_source(source) {
            Ok(tasks) => {
                info!(%source, tasks = tasks.len(), "loaded task source");
                Ok(self.store.insert(source.clone(), tasks))
            }
            Err(err) => {
                warn!(%source, error = %err, "failed to load task source");
                Err(err)
            }
        }
    }
}

/// Reads and normalizes a source without touching any cache.
pub fn read_source(source: &SourceId) -> Result<TaskSet, LoadError> {
    let path = source.path();
    let format = SourceFormat::detect(path)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let table = match format {
        SourceFormat::Delimited(delimiter) => {
            let file = File::open(path)?;
            delimited::read_table(file, delimiter)?
        }
        SourceFormat::Spreadsheet => spreadsheet::read_table(path)?,
    };

    Ok(normalize(&table)?)
}

/// Normalizes comma-separated task data from any reader, such as an uploaded body.
pub fn read_delimited<R: Read>(reader: R) -> Result<TaskSet, LoadError> {
    let table = delimited::read_table(reader, b',')?;
    Ok(normalize(&table)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::schema::SchemaError;
    use crate::tasks::store::InMemoryTaskSetStore;
    use std::io::Write;

    const SHEET: &str = "Task No,Task,Status,Progress,Start date,End date,Assignees,Remarks\n\
1,Draft plan,Completed,100,2024-01-01,2024-01-05,Asha,\n\
2,Build rig,In Progress,40,2024-01-01,2024-01-11,\"Miguel, Asha\",Waiting on parts\n";

    fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> SourceId {
        let path = dir.path().join(name);
        let mut file = File::create(&path).expect("create source file");
        file.write_all(contents.as_bytes()).expect("write source file");
        SourceId::new(path)
    }

    #[test]
    fn format_detection_uses_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("data/1.CSV")),
            Some(SourceFormat::Delimited(b','))
        );
        assert_eq!(
            SourceFormat::detect(Path::new("exports/tracker.xlsx")),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(SourceFormat::detect(Path::new("notes.md")), None);
        assert_eq!(SourceFormat::detect(Path::new("no_extension")), None);
    }

    #[test]
    fn read_delimited_normalizes_rows() {
        let tasks = read_delimited(SHEET.as_bytes()).expect("sheet loads");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.find(2).expect("task 2").assignees, "Miguel, Asha");
    }

    #[test]
    fn loader_reads_once_then_serves_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "tracker.csv", SHEET);
        let store = Arc::new(InMemoryTaskSetStore::default());
        let loader = TaskLoader::new(store.clone());

        let first = loader.load_tasks(&source).expect("first load");
        std::fs::remove_file(source.path()).expect("remove source");
        let second = loader.load_tasks(&source).expect("served from cache");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "broken.csv", "Task No,Task\n1,Plan\n");
        let store = Arc::new(InMemoryTaskSetStore::default());
        let loader = TaskLoader::new(store.clone());

        let error = loader.load_tasks(&source).expect_err("schema error");
        assert!(matches!(
            error,
            LoadError::Normalize(NormalizeError::Schema(SchemaError { .. }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_and_unsupported_sources_are_reported() {
        let missing = read_source(&SourceId::new("./does-not-exist.csv")).expect_err("missing");
        assert!(matches!(missing, LoadError::NotFound(_)));

        let unsupported = read_source(&SourceId::new("./tracker.json")).expect_err("unsupported");
        assert!(matches!(unsupported, LoadError::UnsupportedFormat(_)));
    }
}
