use std::path::PathBuf;

use calamine::{Data, Range, Reader};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::data::record::{BeerRecord, BeerTable};
use crate::data::source::{display_path, replace_file, BeerSource, SourceError};

const DEFAULT_SHEET: &str = "Sheet1";

/// Columns written as numeric cells when their text is a plain number. JAN codes stay text
/// (leading zeros).
const NUMERIC_COLUMNS: &[&str] = &["id", "abv", "volume", "price"];

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Excel workbook. Reads the named sheet (or the first one). A save rewrites that sheet and
/// copies every other sheet's cell values back in place; formulas and styling are not kept.
/// Only `.xlsx` files are written.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    sheet: Option<String>,
}

/// One sheet of the workbook being rewritten, in its original order.
enum SheetSlot {
    Table(String),
    Copy(String, Range<Data>),
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    fn read_err(&self, message: impl ToString) -> SourceError {
        SourceError::XlsxRead {
            path: display_path(&self.path),
            message: message.to_string(),
        }
    }

    fn write_err(&self, source: rust_xlsxwriter::XlsxError) -> SourceError {
        SourceError::XlsxWrite {
            path: display_path(&self.path),
            source,
        }
    }

    /// The sheet holding the beer table: the configured one, else the first.
    fn table_sheet(&self, names: &[String]) -> Result<String, SourceError> {
        match &self.sheet {
            Some(name) => Ok(name.clone()),
            None => names
                .first()
                .cloned()
                .ok_or_else(|| self.read_err("workbook has no sheets")),
        }
    }

    fn ensure_writable(&self) -> Result<(), SourceError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ext.eq_ignore_ascii_case("xlsx") {
            return Ok(());
        }
        Err(SourceError::Unsupported(format!(
            "{} (only .xlsx workbooks are writable)",
            display_path(&self.path)
        )))
    }

    fn sheet_layout(&self) -> Result<Vec<SheetSlot>, SourceError> {
        if !self.path.is_file() {
            let name = self.sheet.clone().unwrap_or_else(|| DEFAULT_SHEET.to_string());
            return Ok(vec![SheetSlot::Table(name)]);
        }
        let mut wb = calamine::open_workbook_auto(&self.path).map_err(|e| self.read_err(e))?;
        let names = wb.sheet_names();
        let table_sheet = self.table_sheet(&names)?;

        let mut layout = Vec::with_capacity(names.len() + 1);
        for name in names {
            if name == table_sheet {
                layout.push(SheetSlot::Table(name));
            } else {
                let range = wb.worksheet_range(&name).map_err(|e| self.read_err(e))?;
                layout.push(SheetSlot::Copy(name, range));
            }
        }
        if !layout.iter().any(|slot| matches!(slot, SheetSlot::Table(_))) {
            layout.push(SheetSlot::Table(table_sheet));
        }
        Ok(layout)
    }

    fn write_table(&self, worksheet: &mut Worksheet, table: &BeerTable) -> Result<(), SourceError> {
        let headers = table.output_headers();
        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, header.as_str())
                .map_err(|e| self.write_err(e))?;
        }
        for (i, record) in table.records.iter().enumerate() {
            let row = (i + 1) as u32;
            for (col, value) in record.to_cells(&headers).iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let numeric = NUMERIC_COLUMNS.contains(&headers[col].as_str());
                match value.parse::<f64>() {
                    Ok(number) if numeric && number.is_finite() => worksheet
                        .write_number(row, col as u16, number)
                        .map_err(|e| self.write_err(e))?,
                    _ => worksheet
                        .write_string(row, col as u16, value.as_str())
                        .map_err(|e| self.write_err(e))?,
                };
            }
        }
        Ok(())
    }

    fn copy_range(&self, worksheet: &mut Worksheet, range: &Range<Data>) -> Result<(), SourceError> {
        let (top, left) = range.start().unwrap_or((0, 0));
        let date = Format::new().set_num_format(DATE_FORMAT);
        for (r, c, cell) in range.used_cells() {
            let row = top + r as u32;
            let col = (left as usize + c) as u16;
            let written = match cell {
                Data::Empty => continue,
                Data::Int(i) => worksheet.write_number(row, col, *i as f64),
                Data::Float(f) => worksheet.write_number(row, col, *f),
                Data::Bool(b) => worksheet.write_boolean(row, col, *b),
                Data::DateTime(dt) => worksheet.write_number_with_format(row, col, dt.as_f64(), &date),
                Data::String(s) => worksheet.write_string(row, col, s.as_str()),
                other => worksheet.write_string(row, col, cell_str(other)),
            };
            written.map_err(|e| self.write_err(e))?;
        }
        Ok(())
    }
}

pub fn cell_str(d: &Data) -> String {
    match d {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format!("{}", f),
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => format!("{:?}", d),
    }
}

impl BeerSource for XlsxSource {
    fn identity(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("xlsx:{}#{}", display_path(&self.path), sheet),
            None => format!("xlsx:{}", display_path(&self.path)),
        }
    }

    fn load(&self) -> Result<BeerTable, SourceError> {
        let mut wb = calamine::open_workbook_auto(&self.path).map_err(|e| self.read_err(e))?;
        let sheet_name = self.table_sheet(&wb.sheet_names())?;
        let range = wb
            .worksheet_range(&sheet_name)
            .map_err(|e| self.read_err(e))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(|c| cell_str(c).trim().to_string()).collect(),
            None => {
                return Err(SourceError::MissingHeader {
                    path: display_path(&self.path),
                })
            }
        };

        let records: Vec<BeerRecord> = rows
            .map(|row| {
                let cells: Vec<String> = row.iter().map(cell_str).collect();
                BeerRecord::from_cells(&headers, &cells)
            })
            .collect();
        debug!(path = %self.path.display(), sheet = %sheet_name, rows = records.len(), "read xlsx source");
        Ok(BeerTable { headers, records })
    }

    fn save(&self, table: &BeerTable) -> Result<(), SourceError> {
        self.ensure_writable()?;
        let layout = self.sheet_layout()?;

        let mut workbook = Workbook::new();
        for slot in &layout {
            let worksheet = workbook.add_worksheet();
            match slot {
                SheetSlot::Table(name) => {
                    worksheet.set_name(name.as_str()).map_err(|e| self.write_err(e))?;
                    self.write_table(worksheet, table)?;
                }
                SheetSlot::Copy(name, range) => {
                    worksheet.set_name(name.as_str()).map_err(|e| self.write_err(e))?;
                    self.copy_range(worksheet, range)?;
                }
            }
        }

        let tmp = self.path.with_extension("xlsx.tmp");
        replace_file(&self.path, &tmp, |tmp| {
            workbook.save(tmp).map_err(|e| self.write_err(e))
        })?;
        debug!(
            path = %self.path.display(),
            sheets = layout.len(),
            rows = table.records.len(),
            "wrote xlsx source"
        );
        Ok(())
    }
}
