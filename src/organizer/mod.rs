//! Organization driver.
//!
//! Loads the data file, then walks the records strictly in order: each record
//! gets its folders created and its PDF copied. A record whose PDF is missing
//! or fails to copy is tallied and skipped; only loader errors and folder
//! creation failures stop a run.
//!
//! ## States
//! `Initialized -> Loading -> Processing -> Completed`, or `Failed` when the
//! loader (or folder creation) gives up, or `Interrupted` when the abort flag
//! is raised between records.

mod report;

pub use report::{scan_output_tree, DirectoryTree, LocationNode, RequesterNode, RunSummary, SupplierNode};

use crate::config::OrganizerConfig;
use crate::copy::CopyEngine;
use crate::data::{DataLoader, DataPreview};
use crate::error::{OrganizerError, Result};
use crate::layout::{self, DirectorySynthesizer};
use crate::models::{OrganizationStats, ProgressCallback, ProgressEvent, RunState};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Abort flag shared with whoever may cancel a run (e.g. a Ctrl-C handler)
#[derive(Clone, Default)]
pub struct AbortFlag(pub Arc<AtomicBool>);

impl AbortFlag {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Organizer {
    run_id: Uuid,
    config: OrganizerConfig,
    loader: DataLoader,
    pdf_dir: PathBuf,
    synthesizer: DirectorySynthesizer,
    copier: CopyEngine,
    stats: OrganizationStats,
    state: RunState,
    abort: AbortFlag,
    progress: Option<ProgressCallback>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

fn emit(progress: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = progress {
        callback(&event);
    }
}

impl Organizer {
    /// Validate the directories and prepare a run.
    ///
    /// Fails with `PdfDirectory` when the PDF source is missing or not a
    /// directory, and with `OutputDirectory` when the output root cannot be
    /// created. The data file is not read yet.
    pub fn new(
        data_file: impl Into<PathBuf>,
        pdf_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: OrganizerConfig,
    ) -> Result<Self> {
        let pdf_dir = pdf_dir.into();
        let output_dir = output_dir.into();

        layout::validate_pdf_dir(&pdf_dir)?;
        layout::prepare_output_root(&output_dir)?;

        Ok(Self {
            run_id: Uuid::new_v4(),
            loader: DataLoader::new(data_file, config.clone()),
            copier: CopyEngine::new(pdf_dir.clone(), config.pdf_extension.clone()),
            synthesizer: DirectorySynthesizer::new(output_dir),
            pdf_dir,
            config,
            stats: OrganizationStats::default(),
            state: RunState::Initialized,
            abort: AbortFlag::default(),
            progress: None,
            started_at: None,
            finished_at: None,
        })
    }

    /// Receive a [`ProgressEvent`] for every created folder and every record
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Use an externally owned abort flag
    pub fn with_abort_flag(mut self, flag: AbortFlag) -> Self {
        self.abort = flag;
        self
    }

    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> OrganizationStats {
        self.stats
    }

    pub fn output_dir(&self) -> &Path {
        self.synthesizer.output_root()
    }

    /// Load the data file (if not yet loaded) and describe it
    pub fn preview(&mut self) -> Result<DataPreview> {
        Ok(self.loader.preview()?)
    }

    fn finish(&mut self, state: RunState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Process every record and return the final statistics
    pub fn run(&mut self) -> Result<OrganizationStats> {
        self.stats = OrganizationStats::default();
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.state = RunState::Loading;

        tracing::info!(
            "[Organizer {}] Starting: data={} pdfs={} output={}",
            self.run_id,
            self.loader.path().display(),
            self.pdf_dir.display(),
            self.synthesizer.output_root().display()
        );

        let records = match self.loader.records() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("[Organizer {}] Loading failed: {}", self.run_id, e);
                self.finish(RunState::Failed);
                return Err(e.into());
            }
        };

        let total = records.len();
        self.stats.total_records = total;
        self.state = RunState::Processing;

        for (index, record) in records.iter().enumerate() {
            if self.abort.is_aborted() {
                tracing::warn!(
                    "[Organizer {}] Interrupted after {} of {} records",
                    self.run_id,
                    index,
                    total
                );
                self.finish(RunState::Interrupted);
                return Err(OrganizerError::Interrupted {
                    processed: index,
                    total,
                });
            }

            let progress = &self.progress;
            let destination = match self.synthesizer.resolve_and_ensure(
                record,
                &mut self.stats,
                |path, depth| {
                    emit(
                        progress,
                        ProgressEvent::FolderCreated {
                            path: path.to_path_buf(),
                            depth,
                        },
                    )
                },
            ) {
                Ok(destination) => destination,
                Err(e) => {
                    tracing::error!("[Organizer {}] {}", self.run_id, e);
                    self.finish(RunState::Failed);
                    return Err(e);
                }
            };

            let outcome = self.copier.copy_one(record, &destination.leaf());
            self.stats.record(&outcome);
            emit(
                &self.progress,
                ProgressEvent::from_outcome(index, &record.invoice, &outcome),
            );
        }

        self.finish(RunState::Completed);

        tracing::info!(
            "[Organizer {}] Completed: {} folders created, {} copied, {} not found, {} failed, {} records",
            self.run_id,
            self.stats.folders_created,
            self.stats.files_copied,
            self.stats.files_not_found,
            self.stats.copy_failures,
            self.stats.total_records
        );

        Ok(self.stats)
    }

    /// Structured summary of the last run
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            state: self.state,
            started_at: self.started_at,
            finished_at: self.finished_at,
            data_file: self.loader.path().to_path_buf(),
            pdf_dir: self.pdf_dir.clone(),
            output_dir: self.synthesizer.output_root().to_path_buf(),
            stats: self.stats,
        }
    }

    /// Re-scan the output root's three levels with PDF counts per leaf
    pub fn directory_tree(&self) -> Result<DirectoryTree> {
        scan_output_tree(self.synthesizer.output_root(), &self.config.pdf_extension)
    }
}
