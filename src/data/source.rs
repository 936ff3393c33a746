//! The external table that owns the beer list. Read all rows, overwrite all rows; nothing
//! finer-grained is assumed of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::data::csv_source::CsvSource;
use crate::data::record::BeerTable;
use crate::data::xlsx_source::XlsxSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read workbook {path}: {message}")]
    XlsxRead { path: String, message: String },
    #[error("failed to write workbook {path}: {source}")]
    XlsxWrite {
        path: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("{path} has no header row")]
    MissingHeader { path: String },
    #[error("unsupported source '{0}' (expected .csv, .xlsx or .xls)")]
    Unsupported(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

pub trait BeerSource: Send + Sync {
    /// Stable name of the source; the catalog cache is keyed by it.
    fn identity(&self) -> String;

    fn load(&self) -> Result<BeerTable, SourceError>;

    /// Replace the whole table (header row and all data rows).
    fn save(&self, table: &BeerTable) -> Result<(), SourceError>;
}

impl<S: BeerSource + ?Sized> BeerSource for Arc<S> {
    fn identity(&self) -> String {
        (**self).identity()
    }

    fn load(&self) -> Result<BeerTable, SourceError> {
        (**self).load()
    }

    fn save(&self, table: &BeerTable) -> Result<(), SourceError> {
        (**self).save(table)
    }
}

/// Pick an adapter from the file extension.
pub fn source_from_location(location: &str) -> Result<Box<dyn BeerSource>, SourceError> {
    let path = PathBuf::from(location);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::new(path))),
        "xlsx" | "xlsm" | "xls" => Ok(Box::new(XlsxSource::new(path))),
        _ => Err(SourceError::Unsupported(location.to_string())),
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Write `tmp` through `write`, then rename it over `path`. `tmp` does not outlive a failure.
pub(crate) fn replace_file(
    path: &Path,
    tmp: &Path,
    write: impl FnOnce(&Path) -> Result<(), SourceError>,
) -> Result<(), SourceError> {
    let result = write(tmp).and_then(|()| {
        fs::rename(tmp, path).map_err(|source| SourceError::Io {
            path: display_path(path),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}

/// Table held in memory. Used by tests and by callers that stage edits before export.
#[derive(Debug, Default)]
pub struct MemorySource {
    name: String,
    table: Mutex<BeerTable>,
    fail_writes: Mutex<bool>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, table: BeerTable) -> Self {
        Self {
            name: name.into(),
            table: Mutex::new(table),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make every following `save` fail, to exercise the error path of admin writes.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    pub fn snapshot(&self) -> BeerTable {
        self.table
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl BeerSource for MemorySource {
    fn identity(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn load(&self) -> Result<BeerTable, SourceError> {
        self.table
            .lock()
            .map(|t| t.clone())
            .map_err(|e| SourceError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn save(&self, table: &BeerTable) -> Result<(), SourceError> {
        let fail = self.fail_writes.lock().map(|f| *f).unwrap_or(true);
        if fail {
            return Err(SourceError::Unavailable(format!(
                "{} rejected the write",
                self.identity()
            )));
        }
        let mut guard = self
            .table
            .lock()
            .map_err(|e| SourceError::Unavailable(format!("lock poisoned: {e}")))?;
        *guard = table.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_extension_selects_adapter() {
        assert!(source_from_location("beer_data.xlsx").is_ok());
        assert!(source_from_location("beers.CSV").is_ok());
        assert!(matches!(
            source_from_location("beers.txt"),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn memory_source_can_refuse_writes() {
        let source = MemorySource::new("t", BeerTable::default());
        source.set_fail_writes(true);
        assert!(source.save(&BeerTable::default()).is_err());
        source.set_fail_writes(false);
        assert!(source.save(&BeerTable::default()).is_ok());
    }
}
