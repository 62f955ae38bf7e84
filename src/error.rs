//! Error types for the organizer.
//!
//! Construction and load failures abort a run. Per-record copy problems never
//! show up here; they are tallied as [`CopyOutcome`](crate::models::CopyOutcome)s.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the tabular input file
#[derive(Debug, Error)]
pub enum DataFileError {
    /// The file could not be read or parsed
    #[error("Failed to read data file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Extension is neither delimited text nor a spreadsheet
    #[error("Unsupported data file format: {extension:?} ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The table has no header row at all
    #[error("Data file has no header row: {path}")]
    Empty { path: PathBuf },

    /// Required columns are absent, listed in required-column order
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

impl DataFileError {
    pub(crate) fn read(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DataFileError::Read {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Names of the missing columns, if this is a column validation failure
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            DataFileError::MissingColumns(cols) => Some(cols),
            _ => None,
        }
    }
}

/// Top-level error for an organization run
#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error(transparent)]
    DataFile(#[from] DataFileError),

    /// PDF source directory is missing or is not a directory
    #[error("PDF directory error: {message} ({path})")]
    PdfDirectory { path: PathBuf, message: String },

    /// Output root (or one of its subfolders) cannot be created
    #[error("Output directory error: could not create {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path selection step was abandoned
    #[error("Operation cancelled by the user: {0}")]
    UserCancelled(String),

    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The abort flag was raised while records were being processed
    #[error("Run interrupted after {processed} of {total} records")]
    Interrupted { processed: usize, total: usize },
}

impl OrganizerError {
    /// Whether this error came from reading or validating the data file
    pub fn is_data_file_error(&self) -> bool {
        matches!(self, OrganizerError::DataFile(_))
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            OrganizerError::UserCancelled(_) => 2,
            OrganizerError::Interrupted { .. } => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
