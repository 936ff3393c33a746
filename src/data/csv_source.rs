use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::data::record::{BeerRecord, BeerTable};
use crate::data::source::{display_path, replace_file, BeerSource, SourceError};

/// UTF-8 CSV with a header row. Writes go to a sibling temp file and are renamed into place.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn csv_err(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            path: display_path(&self.path),
            source,
        }
    }

    fn io_err(&self, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: display_path(&self.path),
            source,
        }
    }
}

impl BeerSource for CsvSource {
    fn identity(&self) -> String {
        format!("csv:{}", display_path(&self.path))
    }

    fn load(&self) -> Result<BeerTable, SourceError> {
        let raw = fs::read(&self.path).map_err(|e| self.io_err(e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw.as_slice());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_err(e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(SourceError::MissingHeader {
                path: display_path(&self.path),
            });
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.csv_err(e))?;
            let cells: Vec<&str> = row.iter().collect();
            records.push(BeerRecord::from_cells(&headers, &cells));
        }
        debug!(path = %self.path.display(), rows = records.len(), "read csv source");
        Ok(BeerTable { headers, records })
    }

    fn save(&self, table: &BeerTable) -> Result<(), SourceError> {
        let headers = table.output_headers();
        let tmp = self.path.with_extension("csv.tmp");
        replace_file(&self.path, &tmp, |tmp| {
            let mut writer = csv::Writer::from_path(tmp).map_err(|e| self.csv_err(e))?;
            writer.write_record(&headers).map_err(|e| self.csv_err(e))?;
            for record in &table.records {
                writer
                    .write_record(record.to_cells(&headers))
                    .map_err(|e| self.csv_err(e))?;
            }
            writer.flush().map_err(|e| self.io_err(e))
        })?;
        debug!(path = %self.path.display(), rows = table.records.len(), "wrote csv source");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_with_bom_and_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beers.csv");
        fs::write(&path, "\u{feff}id,name_jp,price\n1,セゾン,600\n2,ランビック\n").unwrap();

        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.headers[0], "id");
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].price, "600");
        assert_eq!(table.records[1].price, "");
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            CsvSource::new(&path).load(),
            Err(SourceError::MissingHeader { .. })
        ));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("beers.csv");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let result = CsvSource::new(&target).save(&BeerTable::default());
        assert!(matches!(result, Err(SourceError::Io { .. })));
        assert!(!dir.path().join("beers.csv.tmp").exists());
    }
}
