//! In-memory tables backed by delimited text or spreadsheets.
//!
//! ## Supported Formats
//! - CSV via the `csv` crate (lossy UTF-8, BOM stripped from the header)
//! - Excel / OpenDocument: .xlsx, .xlsm, .xlsb, .xls, .ods via calamine
//!
//! Both backings expose the same [`TabularSource`] capability, so the loader
//! never cares which format a row came from.

use crate::error::DataFileError;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Read access to a loaded table by column name
pub trait TabularSource: Send + Sync {
    /// Header names in file order
    fn columns(&self) -> &[String];

    /// Number of data rows (header excluded)
    fn row_count(&self) -> usize;

    /// Raw cell text, `None` for an empty cell or an unknown column
    fn row_value(&self, row: usize, column: &str) -> Option<String>;

    fn has_column(&self, column: &str) -> bool {
        self.columns().iter().any(|c| c == column)
    }

    /// First position of `column` in the header
    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| c == column)
    }
}

/// Table parsed from a delimited text file
#[derive(Debug, Clone)]
pub struct CsvTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn open(path: &Path) -> Result<Self, DataFileError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataFileError::read(path, e))?;

        let headers = reader
            .byte_headers()
            .map_err(|e| DataFileError::read(path, e))?
            .clone();

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let name = String::from_utf8_lossy(h);
                if i == 0 {
                    name.trim_start_matches('\u{feff}').to_string()
                } else {
                    name.into_owned()
                }
            })
            .collect();

        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(DataFileError::Empty {
                path: path.to_path_buf(),
            });
        }

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result.map_err(|e| DataFileError::read(path, e))?;
            // Short rows leave their trailing cells empty; extra fields have no column
            if record.len() > columns.len() {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(DataFileError::read(
                    path,
                    format!(
                        "line {} has {} fields but the header has {}",
                        line,
                        record.len(),
                        columns.len()
                    ),
                ));
            }
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        tracing::debug!(
            "[CsvTable] Parsed {} rows, {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );

        Ok(Self { columns, rows })
    }
}

impl TabularSource for CsvTable {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_value(&self, row: usize, column: &str) -> Option<String> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(idx))
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

/// Table read from the first worksheet of a workbook
#[derive(Debug, Clone)]
pub struct SheetTable {
    columns: Vec<String>,
    range: Range<Data>,
}

impl SheetTable {
    pub fn open(path: &Path) -> Result<Self, DataFileError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| DataFileError::read(path, e))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DataFileError::Empty {
                path: path.to_path_buf(),
            })?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| DataFileError::read(path, e))?;

        let columns: Vec<String> = match range.rows().next() {
            Some(header) => header
                .iter()
                .map(|cell| cell_text(cell).unwrap_or_default())
                .collect(),
            None => {
                return Err(DataFileError::Empty {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::debug!(
            "[SheetTable] Sheet {:?}: {} rows, {} columns from {}",
            sheet_name,
            range.height().saturating_sub(1),
            columns.len(),
            path.display()
        );

        Ok(Self { columns, range })
    }
}

impl TabularSource for SheetTable {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.range.height().saturating_sub(1)
    }

    fn row_value(&self, row: usize, column: &str) -> Option<String> {
        let idx = self.column_index(column)?;
        // Row 0 of the range is the header
        self.range.get((row + 1, idx)).and_then(cell_text)
    }
}

/// Render a cell as text; whole floats lose their `.0` so invoice numbers
/// typed as numbers still match file names
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            Some(format!("{}", *f as i64))
        }
        Data::Float(f) if f.is_nan() => Some("nan".to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::Error(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_csv_table_reads_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(
            &temp_dir,
            "data.csv",
            b"Factura,Name,Extra\nINV001,Acme,x\nINV002,,y\n",
        );

        let table = CsvTable::open(&path).unwrap();

        assert_eq!(table.columns(), &["Factura", "Name", "Extra"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row_value(0, "Factura").as_deref(), Some("INV001"));
        assert_eq!(table.row_value(1, "Name"), None);
        assert_eq!(table.row_value(0, "Missing"), None);
        assert_eq!(table.row_value(5, "Factura"), None);
    }

    #[test]
    fn test_csv_table_strips_bom_and_decodes_latin1() {
        let temp_dir = TempDir::new().unwrap();
        let mut content = b"\xEF\xBB\xBFNombre del Solicitante,Factura\n".to_vec();
        content.extend_from_slice(b"Jos\xE9,INV9\n");
        let path = write_csv(&temp_dir, "data.csv", &content);

        let table = CsvTable::open(&path).unwrap();

        assert!(table.has_column("Nombre del Solicitante"));
        let name = table.row_value(0, "Nombre del Solicitante").unwrap();
        assert!(name.starts_with("Jos"));
    }

    #[test]
    fn test_csv_short_row_leaves_cells_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "short.csv", b"a,b,c\n1,2\n4,5,6\n");

        let table = CsvTable::open(&path).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row_value(0, "b").as_deref(), Some("2"));
        assert_eq!(table.row_value(0, "c"), None);
        assert_eq!(table.row_value(1, "c").as_deref(), Some("6"));
    }

    #[test]
    fn test_csv_long_row_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "bad.csv", b"a,b\n1,2,3\n");

        assert!(matches!(
            CsvTable::open(&path),
            Err(DataFileError::Read { .. })
        ));
    }

    #[test]
    fn test_empty_csv_has_no_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "empty.csv", b"");

        assert!(matches!(
            CsvTable::open(&path),
            Err(DataFileError::Empty { .. })
        ));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_csv(&temp_dir, "broken.xlsx", b"this is not a zip archive");

        assert!(matches!(
            SheetTable::open(&path),
            Err(DataFileError::Read { .. })
        ));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1001.0)).as_deref(), Some("1001"));
        assert_eq!(cell_text(&Data::Float(12.5)).as_deref(), Some("12.5"));
        assert_eq!(cell_text(&Data::Int(42)).as_deref(), Some("42"));
        assert_eq!(cell_text(&Data::String("Acme".into())).as_deref(), Some("Acme"));
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }
}
