//! Tabular record loading.
//!
//! [`DataLoader`] reads the data file once, checks the required columns and
//! projects every row into a [`NormalizedRecord`].

pub mod table;

use crate::config::OrganizerConfig;
use crate::error::DataFileError;
use crate::models::NormalizedRecord;
use crate::sanitize::is_nan_marker;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use table::{CsvTable, SheetTable, TabularSource};

/// Backing format chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Spreadsheet,
}

impl DataFormat {
    pub fn detect(path: &Path, config: &OrganizerConfig) -> Result<Self, DataFileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        if config.csv_extensions.iter().any(|e| *e == ext) {
            Ok(DataFormat::Csv)
        } else if config.spreadsheet_extensions.iter().any(|e| *e == ext) {
            Ok(DataFormat::Spreadsheet)
        } else {
            Err(DataFileError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            })
        }
    }
}

/// Read a table from `path`, dispatching on its extension
pub fn load(path: &Path, config: &OrganizerConfig) -> Result<Box<dyn TabularSource>, DataFileError> {
    let table: Box<dyn TabularSource> = match DataFormat::detect(path, config)? {
        DataFormat::Csv => Box::new(CsvTable::open(path)?),
        DataFormat::Spreadsheet => Box::new(SheetTable::open(path)?),
    };
    Ok(table)
}

/// Fail with every required column the table lacks, in required order
pub fn validate(table: &dyn TabularSource, required_columns: &[String]) -> Result<(), DataFileError> {
    let missing: Vec<String> = required_columns
        .iter()
        .filter(|col| !table.has_column(col))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataFileError::MissingColumns(missing))
    }
}

/// Missing-value-safe coercion: null, blank or `nan` become the placeholder
pub fn coerce_value(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        None => placeholder.to_string(),
        Some(v) if v.is_empty() || is_nan_marker(v) => placeholder.to_string(),
        Some(v) => v.to_string(),
    }
}

/// One record per row, in row order. A location column absent from the
/// table yields the placeholder for every row.
pub fn project(table: &dyn TabularSource, config: &OrganizerConfig) -> Vec<NormalizedRecord> {
    let cols = &config.columns;
    let placeholder = config.placeholder.as_str();
    let has_location = table.has_column(&cols.location);

    (0..table.row_count())
        .map(|row| {
            let value = |column: &str| coerce_value(table.row_value(row, column).as_deref(), placeholder);

            NormalizedRecord {
                location: if has_location {
                    value(&cols.location)
                } else {
                    placeholder.to_string()
                },
                requester: value(&cols.requester),
                invoice: value(&cols.invoice),
                supplier: value(&cols.supplier),
            }
        })
        .collect()
}

/// Summary of a loaded data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPreview {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub unique_requesters: usize,
    pub unique_suppliers: usize,
    /// 0 when the location column is absent
    pub unique_locations: usize,
}

impl std::fmt::Display for DataPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== DATA PREVIEW ===")?;
        writeln!(f, "Total records: {}", self.total_records)?;
        writeln!(f, "Columns found: {}", self.columns.join(", "))?;
        writeln!(f, "- Unique requesters: {}", self.unique_requesters)?;
        writeln!(f, "- Unique suppliers: {}", self.unique_suppliers)?;
        write!(f, "- Unique locations: {}", self.unique_locations)
    }
}

fn count_unique(table: &dyn TabularSource, column: &str) -> usize {
    if !table.has_column(column) {
        return 0;
    }
    (0..table.row_count())
        .filter_map(|row| table.row_value(row, column))
        .filter(|v| !is_nan_marker(v.trim()))
        .collect::<HashSet<_>>()
        .len()
}

/// Reads a data file once and hands out validated records
pub struct DataLoader {
    path: PathBuf,
    config: OrganizerConfig,
    table: Option<Box<dyn TabularSource>>,
}

impl DataLoader {
    pub fn new(path: impl Into<PathBuf>, config: OrganizerConfig) -> Self {
        Self {
            path: path.into(),
            config,
            table: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, reading the file only on the first call
    pub fn load(&mut self) -> Result<&dyn TabularSource, DataFileError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                let table = load(&self.path, &self.config)?;
                tracing::info!(
                    "[DataLoader] Read {}: {} records",
                    self.path.display(),
                    table.row_count()
                );
                table
            }
        };

        Ok(&**self.table.insert(table))
    }

    /// Check the configured required columns
    pub fn validate(&mut self) -> Result<(), DataFileError> {
        let required = self.config.required_columns();
        let table = self.load()?;
        validate(table, &required).inspect_err(|e| {
            tracing::error!("[DataLoader] {}", e);
        })
    }

    /// Validated, normalized records in row order
    pub fn records(&mut self) -> Result<Vec<NormalizedRecord>, DataFileError> {
        self.validate()?;
        let config = self.config.clone();
        let table = self.load()?;
        Ok(project(table, &config))
    }

    pub fn preview(&mut self) -> Result<DataPreview, DataFileError> {
        let cols = self.config.columns.clone();
        let table = self.load()?;

        Ok(DataPreview {
            total_records: table.row_count(),
            columns: table.columns().to_vec(),
            unique_requesters: count_unique(table, &cols.requester),
            unique_suppliers: count_unique(table, &cols.supplier),
            unique_locations: count_unique(table, &cols.location),
        })
    }
}
