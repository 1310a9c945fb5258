//! Archive processing pipeline
//!
//! Each archive goes through:
//! - Extraction into a working directory next to the archives
//! - Removal of metadata sidecars and OS artifacts
//! - Relocation of the photo folder into `<destination>/<number>/`
//! - Removal of the working directory, whatever happened before
//!
//! Archives are processed one at a time in discovery order. A failing
//! archive is logged and recorded; the batch carries on.

use crate::config::Config;
use crate::discovery::{ArchiveEntry, ArchivePattern, find_archives};
use crate::error::{Error, Result};
use crate::extract::extract_archive;
use crate::relocate::{ensure_dir, move_contents};
use crate::sanitize::remove_junk;
use crate::workdir::WorkingDirectory;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, debug, error, info, span, warn};

/// Lifecycle of a single archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStage {
    /// Working directory allocated
    Created,
    /// Unpacking into the working directory
    Extracting,
    /// Removing junk from the working directory
    Sanitizing,
    /// Moving photos into the destination folder
    Relocating,
    /// Removing the working directory
    CleaningUp,
    /// Finished successfully
    Done,
    /// Finished with an error
    Failed,
}

impl ArchiveStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ArchiveStage::Done | ArchiveStage::Failed)
    }
}

/// Result of processing a single archive
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    /// Archive file name
    pub archive: String,
    /// Sequence number (destination folder name)
    pub number: String,
    /// Destination folder (if content was relocated)
    pub destination: Option<PathBuf>,
    /// Last stage reached
    pub stage: ArchiveStage,
    /// Entries written during extraction
    pub extracted: usize,
    /// Junk items removed
    pub junk_removed: usize,
    /// Junk items that could not be removed
    pub junk_failed: usize,
    /// Items moved into the destination
    pub moved: usize,
    /// Extraction error, if extraction failed (non-fatal)
    pub extraction_error: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl ArchiveResult {
    fn new(archive: &ArchiveEntry) -> Self {
        Self {
            archive: archive.filename.clone(),
            number: archive.number.clone(),
            destination: None,
            stage: ArchiveStage::Created,
            extracted: 0,
            junk_removed: 0,
            junk_failed: 0,
            moved: 0,
            extraction_error: None,
            error: None,
        }
    }

    fn fail(mut self, error: Error) -> ArchiveFailure {
        self.advance(ArchiveStage::Failed);
        self.error = Some(error.to_string());
        ArchiveFailure {
            result: Box::new(self),
            error,
        }
    }

    fn advance(&mut self, next: ArchiveStage) {
        debug_assert!(!self.stage.is_terminal(), "archive already finished");
        debug!(archive = %self.archive, from = ?self.stage, to = ?next, "Stage transition");
        self.stage = next;
    }

    pub fn is_success(&self) -> bool {
        self.stage == ArchiveStage::Done
    }
}

/// A failed archive together with everything recorded before the failure
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ArchiveFailure {
    /// Partial result; `stage` is `Failed` and `error` is set
    pub result: Box<ArchiveResult>,
    pub error: Error,
}

/// Processing statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub archives_found: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items_moved: usize,
    pub junk_removed: usize,
    pub junk_failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: &ArchiveResult) {
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.items_moved += result.moved;
        self.junk_removed += result.junk_removed;
        self.junk_failed += result.junk_failed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Archives: {}, Succeeded: {}, Failed: {}, Moved: {}, Junk removed: {}, Junk not removed: {}",
            self.archives_found,
            self.succeeded,
            self.failed,
            self.items_moved,
            self.junk_removed,
            self.junk_failed
        )
    }
}

/// Main processor for consolidating takeout archives
pub struct Processor {
    config: Config,
    pattern: ArchivePattern,
    stats: ProcessingStats,
}

impl Processor {
    /// Create a new processor with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let pattern = ArchivePattern::new(&config.archive_prefix, &config.archive_extension)?;
        Ok(Self {
            config,
            pattern,
            stats: ProcessingStats::new(),
        })
    }

    /// Run the full batch
    ///
    /// Only a missing source directory, an uncreatable destination or an
    /// unreadable source listing abort the run; per-archive failures are
    /// reported in the returned results.
    pub fn run(&mut self) -> Result<Vec<ArchiveResult>> {
        let source = &self.config.source_dir;
        if !source.is_dir() {
            return Err(Error::SourceNotFound {
                path: source.clone(),
            });
        }

        ensure_dir(&self.config.dest_dir)?;

        let archives = find_archives(source, &self.pattern)?;
        self.stats.archives_found = archives.len();

        if archives.is_empty() {
            let pattern = format!(
                "{}-*-<number>.{}",
                self.config.archive_prefix, self.config.archive_extension
            );
            info!(source = %source.display(), %pattern, "No archives found matching the pattern");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(archives.len());
        for archive in &archives {
            let result = match process_archive(archive, &self.config) {
                Ok(result) => result,
                Err(failure) => {
                    error!(archive = %archive.filename, error = %failure, "Error processing archive");
                    *failure.result
                }
            };
            self.stats.record(&result);
            results.push(result);
        }

        info!("{}", self.stats.summary());
        Ok(results)
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Process one archive from extraction to cleanup
///
/// The working directory is removed before returning, on success and on
/// failure alike. A failure still carries the counts gathered so far.
pub fn process_archive(
    archive: &ArchiveEntry,
    config: &Config,
) -> std::result::Result<ArchiveResult, ArchiveFailure> {
    let span = span!(Level::INFO, "archive", name = %archive.filename);
    let _enter = span.enter();
    info!(number = %archive.number, "Processing archive");

    let mut result = ArchiveResult::new(archive);
    let workdir = match WorkingDirectory::create(config.work_root(), &archive.base_name) {
        Ok(workdir) => workdir,
        Err(e) => return Err(result.fail(e)),
    };

    let outcome = run_stages(archive, config, workdir.path(), &mut result);

    result.advance(ArchiveStage::CleaningUp);
    if !workdir.release() {
        warn!("Working directory could not be fully removed");
    }

    match outcome {
        Ok(()) => {
            result.advance(ArchiveStage::Done);
            info!(moved = result.moved, "Archive processed");
            Ok(result)
        }
        Err(e) => Err(result.fail(e)),
    }
}

fn run_stages(
    archive: &ArchiveEntry,
    config: &Config,
    work: &Path,
    result: &mut ArchiveResult,
) -> Result<()> {
    result.advance(ArchiveStage::Extracting);
    match extract_archive(&archive.path, work) {
        Ok(count) => result.extracted = count,
        Err(e) => {
            error!(error = %e, "Failed to extract archive, continuing with partial contents");
            result.extraction_error = Some(e.to_string());
        }
    }

    result.advance(ArchiveStage::Sanitizing);
    let report = remove_junk(work, &config.junk);
    result.junk_removed = report.removed;
    result.junk_failed = report.failed;

    result.advance(ArchiveStage::Relocating);
    let content = work.join(&config.content_subpath);
    if !content.is_dir() {
        return Err(Error::MissingContent {
            path: config.content_subpath.clone(),
        });
    }

    let destination = ensure_dir(&config.dest_dir.join(&archive.number))?;
    info!(directory = %destination.display(), "Created destination directory");

    let moved = move_contents(&content, &destination)?;
    result.moved = moved.len();
    result.destination = Some(destination);
    Ok(())
}
