use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One input row reduced to the four fields the layout needs.
///
/// Every field is non-empty; missing cells carry the configured placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub location: String,
    pub requester: String,
    pub invoice: String,
    pub supplier: String,
}

impl NormalizedRecord {
    pub fn new(
        location: impl Into<String>,
        requester: impl Into<String>,
        invoice: impl Into<String>,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            requester: requester.into(),
            invoice: invoice.into(),
            supplier: supplier.into(),
        }
    }
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    /// Folders that did not exist before this run
    pub folders_created: usize,
    pub files_copied: usize,
    pub files_not_found: usize,
    /// Source present but the copy itself failed
    pub copy_failures: usize,
    pub total_records: usize,
}

impl OrganizationStats {
    /// Tally a copy outcome
    pub fn record(&mut self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Copied { .. } => self.files_copied += 1,
            CopyOutcome::NotFound { .. } => self.files_not_found += 1,
            CopyOutcome::CopyFailed { .. } => self.copy_failures += 1,
        }
    }

    /// Records that reached the copy step
    pub fn processed(&self) -> usize {
        self.files_copied + self.files_not_found + self.copy_failures
    }
}

/// Result of copying a single record's PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyOutcome {
    /// File copied (or overwritten) at the destination
    Copied { destination: PathBuf, bytes: u64 },
    /// No `<invoice>.pdf` in the source directory
    NotFound { expected: PathBuf },
    /// Source present but the copy failed; the record is skipped
    CopyFailed { source: PathBuf, message: String },
}

/// Lifecycle of an organization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Directories validated, nothing read yet
    Initialized,
    /// Reading and validating the data file
    Loading,
    /// Iterating records
    Processing,
    Completed,
    /// Loader stage failed before any copy
    Failed,
    /// Abort flag observed between records
    Interrupted,
}

/// Progress notifications emitted while records are processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    FolderCreated {
        path: PathBuf,
        /// 1 = location, 2 = requester, 3 = supplier
        depth: usize,
    },
    Copied {
        index: usize,
        invoice: String,
        destination: PathBuf,
    },
    NotFound {
        index: usize,
        invoice: String,
    },
    CopyFailed {
        index: usize,
        invoice: String,
        message: String,
    },
}

impl ProgressEvent {
    pub(crate) fn from_outcome(index: usize, invoice: &str, outcome: &CopyOutcome) -> Self {
        match outcome {
            CopyOutcome::Copied { destination, .. } => ProgressEvent::Copied {
                index,
                invoice: invoice.to_string(),
                destination: destination.clone(),
            },
            CopyOutcome::NotFound { .. } => ProgressEvent::NotFound {
                index,
                invoice: invoice.to_string(),
            },
            CopyOutcome::CopyFailed { message, .. } => ProgressEvent::CopyFailed {
                index,
                invoice: invoice.to_string(),
                message: message.clone(),
            },
        }
    }
}

/// Observer for [`ProgressEvent`]s
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;
