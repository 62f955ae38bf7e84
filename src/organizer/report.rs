//! Run summary and output tree re-scan.

use crate::error::{OrganizerError, Result};
use crate::models::{OrganizationStats, RunState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub state: RunState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub data_file: PathBuf,
    pub pdf_dir: PathBuf,
    pub output_dir: PathBuf,
    pub stats: OrganizationStats,
}

impl RunSummary {
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        writeln!(f, "=== SUMMARY ===")?;
        writeln!(f, "Folders created: {}", s.folders_created)?;
        writeln!(f, "Files copied successfully: {}", s.files_copied)?;
        writeln!(f, "Files not found: {}", s.files_not_found)?;
        if s.copy_failures > 0 {
            writeln!(f, "Files that failed to copy: {}", s.copy_failures)?;
        }
        write!(f, "Total records processed: {}", s.total_records)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierNode {
    pub name: String,
    pub pdf_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterNode {
    pub name: String,
    pub suppliers: Vec<SupplierNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub name: String,
    pub requesters: Vec<RequesterNode>,
}

/// Three-level view of an output root, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectoryTree(pub Vec<LocationNode>);

impl DirectoryTree {
    pub fn locations(&self) -> &[LocationNode] {
        &self.0
    }

    pub fn total_pdfs(&self) -> usize {
        self.0
            .iter()
            .flat_map(|l| &l.requesters)
            .flat_map(|r| &r.suppliers)
            .map(|s| s.pdf_count)
            .sum()
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=== CREATED STRUCTURE ===")?;
        for location in &self.0 {
            write!(f, "\n{}/", location.name)?;
            for requester in &location.requesters {
                write!(f, "\n  {}/", requester.name)?;
                for supplier in &requester.suppliers {
                    write!(f, "\n    {}/ ({} files)", supplier.name, supplier.pdf_count)?;
                }
            }
        }
        Ok(())
    }
}

fn count_pdfs(dir: &Path, pdf_extension: &str) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .filter(|e| e.file_name().to_string_lossy().ends_with(pdf_extension))
                .count()
        })
        .unwrap_or(0)
}

/// Walk `root` down to depth 3. Read-only; files above the supplier level
/// are ignored.
pub fn scan_output_tree(root: &Path, pdf_extension: &str) -> Result<DirectoryTree> {
    let mut locations: Vec<LocationNode> = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(3)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| OrganizerError::OutputDirectory {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            source: e.into(),
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        match entry.depth() {
            1 => locations.push(LocationNode {
                name,
                requesters: Vec::new(),
            }),
            2 => {
                if let Some(location) = locations.last_mut() {
                    location.requesters.push(RequesterNode {
                        name,
                        suppliers: Vec::new(),
                    });
                }
            }
            _ => {
                if let Some(requester) = locations
                    .last_mut()
                    .and_then(|l| l.requesters.last_mut())
                {
                    requester.suppliers.push(SupplierNode {
                        pdf_count: count_pdfs(entry.path(), pdf_extension),
                        name,
                    });
                }
            }
        }
    }

    Ok(DirectoryTree(locations))
}
