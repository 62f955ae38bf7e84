//! Copies an invoice PDF from the flat source directory into its folder.

use crate::models::{CopyOutcome, NormalizedRecord};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CopyEngine {
    source_dir: PathBuf,
    pdf_extension: String,
}

impl CopyEngine {
    pub fn new(source_dir: impl Into<PathBuf>, pdf_extension: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            pdf_extension: pdf_extension.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// `<invoice><ext>`, exact and case-sensitive
    pub fn file_name(&self, invoice: &str) -> String {
        format!("{}{}", invoice, self.pdf_extension)
    }

    /// Copy the record's PDF into `destination_dir`, overwriting any file
    /// already there. Never fails: problems come back as outcomes.
    pub fn copy_one(&self, record: &NormalizedRecord, destination_dir: &Path) -> CopyOutcome {
        let file_name = self.file_name(&record.invoice);
        let source = self.source_dir.join(&file_name);

        // Only plain names can live in a flat directory
        if !is_plain_name(&record.invoice) || !source.is_file() {
            tracing::warn!("[CopyEngine] File not found: {}", file_name);
            return CopyOutcome::NotFound { expected: source };
        }

        let destination = destination_dir.join(&file_name);

        // Copying a file onto itself truncates it to zero bytes
        if is_same_file(&source, &destination) {
            tracing::warn!(
                "[CopyEngine] {} is already at its destination {}",
                file_name,
                destination_dir.display()
            );
            return CopyOutcome::CopyFailed {
                source,
                message: "source and destination are the same file".to_string(),
            };
        }

        match copy_preserving_mtime(&source, &destination) {
            Ok(bytes) => {
                tracing::info!(
                    "[CopyEngine] Copied {} -> {} ({} bytes)",
                    file_name,
                    destination_dir.display(),
                    bytes
                );
                CopyOutcome::Copied { destination, bytes }
            }
            Err(e) => {
                tracing::error!("[CopyEngine] Failed to copy {}: {}", file_name, e);
                CopyOutcome::CopyFailed {
                    source,
                    message: e.to_string(),
                }
            }
        }
    }
}

fn is_plain_name(invoice: &str) -> bool {
    !invoice.contains(['/', '\\']) && !invoice.chars().all(|c| c == '.')
}

/// Same inode on the same device, so hard links and symlinks count too
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Byte copy, then carry over the source's modification time. Only the copy
/// itself can fail; mtime problems are logged.
fn copy_preserving_mtime(source: &Path, destination: &Path) -> std::io::Result<u64> {
    let mtime = fs::metadata(source).map(|m| FileTime::from_last_modification_time(&m));
    let bytes = fs::copy(source, destination)?;

    let result = mtime.and_then(|mtime| filetime::set_file_mtime(destination, mtime));
    if let Err(e) = result {
        tracing::debug!(
            "[CopyEngine] Could not preserve mtime on {}: {}",
            destination.display(),
            e
        );
    }

    Ok(bytes)
}
