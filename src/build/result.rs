//! Build result types.
//!
//! Contains types for representing the outcome of build operations.

use crate::build::transform::{FileAction, TransformOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// One or more artifacts written
    Written,
    /// Deliberately produced nothing
    Skipped,
    /// Transform failed
    Failed(String),
}

impl FileStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, FileStatus::Written | FileStatus::Skipped)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, FileStatus::Failed(_))
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Written => write!(f, "written"),
            FileStatus::Skipped => write!(f, "skipped"),
            FileStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of transforming one source file.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source path relative to the mod root
    pub relative: String,
    /// Branch taken, if classification got that far
    pub action: Option<FileAction>,
    /// Outcome
    pub status: FileStatus,
    /// Files written
    pub outputs: Vec<PathBuf>,
    /// Time spent on this file
    pub duration: Duration,
}

impl FileResult {
    /// Build a result from a completed transform.
    pub fn from_outcome(outcome: TransformOutcome, duration: Duration) -> Self {
        let status = if outcome.is_skipped() { FileStatus::Skipped } else { FileStatus::Written };
        Self {
            relative: outcome.relative,
            action: Some(outcome.action),
            status,
            outputs: outcome.outputs,
            duration,
        }
    }

    /// Create a failed result.
    pub fn failed(relative: String, error: String, duration: Duration) -> Self {
        Self { relative, action: None, status: FileStatus::Failed(error), outputs: vec![], duration }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Output folder that was built
    pub output_dir: PathBuf,
    /// Launcher descriptor written next to the output folder
    pub outer_descriptor: PathBuf,
    /// Results for each source file
    pub files: Vec<FileResult>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file result.
    pub fn add_result(&mut self, result: FileResult) {
        self.files.push(result);
    }

    /// Check if all files succeeded.
    pub fn is_success(&self) -> bool {
        self.files.iter().all(|f| f.is_success())
    }

    /// Number of source files that produced output.
    pub fn written_count(&self) -> usize {
        self.files.iter().filter(|f| f.status == FileStatus::Written).count()
    }

    /// Number of skipped source files.
    pub fn skipped_count(&self) -> usize {
        self.files.iter().filter(|f| f.status == FileStatus::Skipped).count()
    }

    /// Number of failed source files.
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|f| f.status.is_failure()).count()
    }

    /// Total artifacts written.
    pub fn artifact_count(&self) -> usize {
        self.files.iter().map(|f| f.outputs.len()).sum()
    }

    /// Get failed file results.
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| f.status.is_failure())
    }

    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Built {} file(s), {} artifact(s), {} skipped in {:.2}s",
            self.written_count(),
            self.artifact_count(),
            self.skipped_count(),
            self.total_duration.as_secs_f64()
        );
        let failed = self.failed_count();
        if failed > 0 {
            summary.push_str(&format!(", {} failed", failed));
        }
        summary
    }
}
