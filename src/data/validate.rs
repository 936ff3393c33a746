use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::data::parse::{parse_id, parse_number, StockStatus};
use crate::data::record::{BeerTable, COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Stock cells that mean "none" on purpose; anything else unrecognized gets a warning.
const KNOWN_UNAVAILABLE: &[&str] = &["", "×", "✕", "x", "X", "なし", "no", "0", "false"];

/// Check a source table: ids must parse and be unique; numeric and stock cells should be
/// understood by the loader.
pub fn validate_table(table: &BeerTable) -> ValidationReport {
    let mut report = ValidationReport {
        rows: table.records.len(),
        ..ValidationReport::default()
    };

    for column in COLUMNS {
        if !table.headers.iter().any(|h| h.trim() == *column) {
            report.push(
                ValidationSeverity::Info,
                "header",
                format!("column '{column}' missing; treated as empty"),
            );
        }
    }

    let mut first_line_by_id: HashMap<i64, usize> = HashMap::new();
    for (index, record) in table.records.iter().enumerate() {
        if record.is_blank() {
            continue;
        }
        // spreadsheet line number: header is line 1
        let line = index + 2;
        let context = format!("row[{line}]");

        match parse_id(&record.id) {
            Some(id) => {
                if let Some(first) = first_line_by_id.insert(id, line) {
                    report.push(
                        ValidationSeverity::Error,
                        format!("{context}.id"),
                        format!("duplicate id {id} (first seen on row {first})"),
                    );
                }
            }
            None => report.push(
                ValidationSeverity::Error,
                format!("{context}.id"),
                format!("id '{}' is not a number; row will be skipped", record.id),
            ),
        }

        if record.name_local.trim().is_empty() && record.name_jp.trim().is_empty() {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.name"),
                "neither name_local nor name_jp is set",
            );
        }

        if record.yomi.trim().is_empty() {
            report.push(
                ValidationSeverity::Info,
                format!("{context}.yomi"),
                "no reading; sorts last by name",
            );
        }

        for (column, raw) in [
            ("abv", &record.abv),
            ("volume", &record.volume),
            ("price", &record.price),
        ] {
            if !raw.trim().is_empty() && parse_number(raw).is_none() {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.{column}"),
                    format!("'{raw}' has no numeric value"),
                );
            }
        }

        let stock = record.in_stock.trim();
        if StockStatus::classify(stock) == StockStatus::Unavailable
            && !KNOWN_UNAVAILABLE.contains(&stock)
        {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.in_stock"),
                format!("unrecognized stock value '{stock}'; treated as unavailable"),
            );
        }
    }

    report
}
