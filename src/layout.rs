//! Output folder layout: `<root>/<location>/<requester>/<supplier>/`.

use crate::error::{OrganizerError, Result};
use crate::models::{NormalizedRecord, OrganizationStats};
use crate::sanitize::sanitize;
use std::fs;
use std::path::{Path, PathBuf};

/// Three sanitized segments below the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    pub location: String,
    pub requester: String,
    pub supplier: String,
    root: PathBuf,
}

impl DestinationPath {
    pub fn for_record(root: &Path, record: &NormalizedRecord) -> Self {
        Self {
            location: sanitize(&record.location),
            requester: sanitize(&record.requester),
            supplier: sanitize(&record.supplier),
            root: root.to_path_buf(),
        }
    }

    /// The location, requester and supplier folders, parent first
    pub fn levels(&self) -> [PathBuf; 3] {
        let location = self.root.join(&self.location);
        let requester = location.join(&self.requester);
        let supplier = requester.join(&self.supplier);
        [location, requester, supplier]
    }

    /// Leaf folder that receives the PDF
    pub fn leaf(&self) -> PathBuf {
        self.root
            .join(&self.location)
            .join(&self.requester)
            .join(&self.supplier)
    }

    /// `location/requester/supplier` for display
    pub fn relative(&self) -> String {
        format!("{}/{}/{}", self.location, self.requester, self.supplier)
    }
}

/// The PDF source must exist and be a directory
pub fn validate_pdf_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(OrganizerError::PdfDirectory {
            path: path.to_path_buf(),
            message: "PDF directory does not exist".to_string(),
        });
    }

    if !path.is_dir() {
        return Err(OrganizerError::PdfDirectory {
            path: path.to_path_buf(),
            message: "PDF path is not a directory".to_string(),
        });
    }

    Ok(())
}

/// Create the output root (and parents) if needed
pub fn prepare_output_root(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| OrganizerError::OutputDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Derives destination folders and creates the missing ones
#[derive(Debug, Clone)]
pub struct DirectorySynthesizer {
    output_root: PathBuf,
}

impl DirectorySynthesizer {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn destination_for(&self, record: &NormalizedRecord) -> DestinationPath {
        DestinationPath::for_record(&self.output_root, record)
    }

    /// Make sure every level of the record's destination exists.
    ///
    /// Increments `folders_created` once per level that had to be created
    /// and calls `on_created` with each new folder and its depth (1..=3).
    pub fn resolve_and_ensure(
        &self,
        record: &NormalizedRecord,
        stats: &mut OrganizationStats,
        mut on_created: impl FnMut(&Path, usize),
    ) -> Result<DestinationPath> {
        let destination = self.destination_for(record);

        for (i, level) in destination.levels().iter().enumerate() {
            if level.is_dir() {
                continue;
            }

            fs::create_dir_all(level).map_err(|e| OrganizerError::OutputDirectory {
                path: level.clone(),
                source: e,
            })?;

            stats.folders_created += 1;
            tracing::debug!("[Layout] Created folder: {}", level.display());
            on_created(level, i + 1);
        }

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(location: &str, requester: &str, supplier: &str) -> NormalizedRecord {
        NormalizedRecord::new(location, requester, "INV001", supplier)
    }

    #[test]
    fn test_destination_is_sanitized() {
        let synth = DirectorySynthesizer::new("/out");
        let dest = synth.destination_for(&record("Austin: HQ", "Alice  Smith", "Acme/Corp"));

        assert_eq!(dest.relative(), "Austin_ HQ/Alice Smith/Acme_Corp");
        assert_eq!(dest.leaf(), PathBuf::from("/out/Austin_ HQ/Alice Smith/Acme_Corp"));
    }

    #[test]
    fn test_creates_three_levels_once() {
        let temp_dir = TempDir::new().unwrap();
        let synth = DirectorySynthesizer::new(temp_dir.path());
        let mut stats = OrganizationStats::default();
        let mut created = Vec::new();

        let dest = synth
            .resolve_and_ensure(&record("Austin", "Alice", "Acme"), &mut stats, |p, depth| {
                created.push((p.to_path_buf(), depth))
            })
            .unwrap();

        assert!(dest.leaf().is_dir());
        assert_eq!(stats.folders_created, 3);
        assert_eq!(created.iter().map(|(_, d)| *d).collect::<Vec<_>>(), vec![1, 2, 3]);

        // Re-running is a no-op
        synth
            .resolve_and_ensure(&record("Austin", "Alice", "Acme"), &mut stats, |_, _| {})
            .unwrap();
        assert_eq!(stats.folders_created, 3);

        // A sibling supplier only adds the leaf
        synth
            .resolve_and_ensure(&record("Austin", "Alice", "Globex"), &mut stats, |_, _| {})
            .unwrap();
        assert_eq!(stats.folders_created, 4);
    }

    #[test]
    fn test_colliding_names_share_a_folder() {
        let temp_dir = TempDir::new().unwrap();
        let synth = DirectorySynthesizer::new(temp_dir.path());
        let mut stats = OrganizationStats::default();

        let a = synth
            .resolve_and_ensure(&record("A/B", "X", "Y"), &mut stats, |_, _| {})
            .unwrap();
        let b = synth
            .resolve_and_ensure(&record("A:B", "X", "Y"), &mut stats, |_, _| {})
            .unwrap();

        assert_eq!(a.leaf(), b.leaf());
        assert_eq!(stats.folders_created, 3);
    }

    #[test]
    fn test_file_in_the_way_is_output_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("Austin"), b"not a folder").unwrap();
        let synth = DirectorySynthesizer::new(temp_dir.path());
        let mut stats = OrganizationStats::default();

        let err = synth
            .resolve_and_ensure(&record("Austin", "Alice", "Acme"), &mut stats, |_, _| {})
            .unwrap_err();

        assert!(matches!(err, OrganizerError::OutputDirectory { .. }));
        assert_eq!(stats.folders_created, 0);
    }

    #[test]
    fn test_validate_pdf_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        assert!(validate_pdf_dir(temp_dir.path()).is_ok());
        assert!(matches!(
            validate_pdf_dir(&temp_dir.path().join("missing")),
            Err(OrganizerError::PdfDirectory { .. })
        ));
        assert!(matches!(
            validate_pdf_dir(&file),
            Err(OrganizerError::PdfDirectory { .. })
        ));
    }

    #[test]
    fn test_prepare_output_root() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        prepare_output_root(&nested).unwrap();
        assert!(nested.is_dir());

        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            prepare_output_root(&file.join("sub")),
            Err(OrganizerError::OutputDirectory { .. })
        ));
    }
}
