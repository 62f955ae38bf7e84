//! Organizer configuration.
//!
//! Column names, placeholders and supported extensions are carried in an
//! immutable [`OrganizerConfig`] passed to the loader and driver at
//! construction. Values can be overridden from a JSON file; any field left
//! out keeps its default.

use crate::error::{OrganizerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Names of the source columns that feed each record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnNames {
    pub requester: String,
    pub invoice: String,
    pub supplier: String,
    pub location: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            requester: "Nombre del Solicitante".to_string(),
            invoice: "Factura".to_string(),
            supplier: "Name".to_string(),
            location: "Memo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerConfig {
    pub columns: ColumnNames,

    /// Columns that must all be present before any row is projected.
    /// Defaults to the four mapped columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,

    /// Substituted for missing cell values
    pub placeholder: String,

    /// Appended to the invoice number to find the source file
    pub pdf_extension: String,

    /// Folder name used when no output root is given
    pub output_folder_name: String,

    /// Extensions read as delimited text (lowercase, no dot)
    pub csv_extensions: Vec<String>,

    /// Extensions read as spreadsheets (lowercase, no dot)
    pub spreadsheet_extensions: Vec<String>,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            required_columns: None,
            placeholder: "Not_specified".to_string(),
            pdf_extension: ".pdf".to_string(),
            output_folder_name: "ordenes_organizadas".to_string(),
            csv_extensions: vec!["csv".to_string()],
            spreadsheet_extensions: ["xlsx", "xlsm", "xlsb", "xls", "ods"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl OrganizerConfig {
    /// Required columns in validation order
    pub fn required_columns(&self) -> Vec<String> {
        match &self.required_columns {
            Some(cols) => cols.clone(),
            None => vec![
                self.columns.requester.clone(),
                self.columns.invoice.clone(),
                self.columns.supplier.clone(),
                self.columns.location.clone(),
            ],
        }
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| OrganizerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| OrganizerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Load `path` if given, else the per-user config file when it exists,
    /// else the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.is_file() => {
                tracing::debug!("[Config] Using {}", default.display());
                Self::load(default)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/invoice-organizer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("invoice-organizer").join("config.json"))
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: &str| OrganizerError::Config {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        if self.placeholder.trim().is_empty() {
            return Err(invalid("placeholder must not be empty"));
        }
        if self.pdf_extension.is_empty() {
            return Err(invalid("pdfExtension must not be empty"));
        }
        if self.output_folder_name.trim().is_empty() {
            return Err(invalid("outputFolderName must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_required_columns() {
        let config = OrganizerConfig::default();
        assert_eq!(
            config.required_columns(),
            vec!["Nombre del Solicitante", "Factura", "Name", "Memo"]
        );
        assert_eq!(config.placeholder, "Not_specified");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "columns": { "invoice": "Invoice No" }, "placeholder": "Unknown" }"#,
        )
        .unwrap();

        let config = OrganizerConfig::load(&path).unwrap();

        assert_eq!(config.columns.invoice, "Invoice No");
        assert_eq!(config.columns.requester, "Nombre del Solicitante");
        assert_eq!(config.placeholder, "Unknown");
        assert_eq!(config.pdf_extension, ".pdf");
        assert_eq!(config.required_columns()[1], "Invoice No");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "placeholder": "  " }"#).unwrap();

        let err = OrganizerConfig::load(&path).unwrap_err();
        assert!(matches!(err, OrganizerError::Config { .. }));

        fs::write(&path, "not json").unwrap();
        assert!(OrganizerConfig::load(&path).is_err());
    }
}
