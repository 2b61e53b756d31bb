//! Result types of a batch run.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one pipeline pass learned about one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// The file as found in the input folder.
    pub source: PathBuf,
    /// The PDF that went through extraction (the source itself for PDFs).
    pub pdf_path: Option<PathBuf>,
    /// The model's answer, trimmed.
    pub classification: Option<String>,
    /// Where the PDF ended up, when the rename succeeded.
    pub destination: Option<PathBuf>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
    /// Set when the file was skipped or failed.
    pub error: Option<FileError>,
}

impl FileOutcome {
    pub(crate) fn new(source: PathBuf) -> Self {
        Self {
            source,
            pdf_path: None,
            classification: None,
            destination: None,
            duration_ms: 0,
            error: None,
        }
    }

    /// `true` when the file was renamed into the output folder.
    pub fn is_renamed(&self) -> bool {
        self.error.is_none() && self.destination.is_some()
    }
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Files discovered in the input folder.
    pub total_files: usize,
    /// Files moved into the output folder.
    pub renamed_files: usize,
    /// Files skipped because of their type.
    pub skipped_files: usize,
    /// Files that failed in some stage and stayed in place.
    pub failed_files: usize,
    pub total_duration_ms: u64,
}

/// The full report of [`crate::batch::process_folder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub files: Vec<FileOutcome>,
    pub stats: BatchStats,
}

impl BatchOutput {
    pub(crate) fn from_outcomes(files: Vec<FileOutcome>, total_duration_ms: u64) -> Self {
        let renamed_files = files.iter().filter(|f| f.is_renamed()).count();
        let skipped_files = files
            .iter()
            .filter(|f| f.error.as_ref().is_some_and(FileError::is_skip))
            .count();
        let failed_files = files.len() - renamed_files - skipped_files;
        let stats = BatchStats {
            total_files: files.len(),
            renamed_files,
            skipped_files,
            failed_files,
            total_duration_ms,
        };
        Self { files, stats }
    }
}
