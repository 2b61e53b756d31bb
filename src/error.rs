//! Error types for the dlibri library.
//!
//! Two error types reflect two failure modes:
//!
//! * [`LibriError`] — **Fatal**: the batch cannot run at all (input folder
//!   missing, invalid configuration, provider not configured). Returned as
//!   `Err(LibriError)` from the `process_folder*` entry points.
//!
//! * [`FileError`] — **Non-fatal**: one document failed somewhere in the
//!   pipeline (conversion, extraction, classification, rename). Stored inside
//!   [`crate::output::FileOutcome`]; the batch moves on to the next file and
//!   the failed document stays where it was.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the dlibri library.
#[derive(Debug, Error)]
pub enum LibriError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input folder does not exist.
    #[error("Folder '{}' not found.", path.display())]
    InputFolderNotFound { path: PathBuf },

    /// A directory inside the input tree could not be listed.
    #[error("Failed to read directory '{}': {source}", path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The named LLM provider could not be created (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// One variant per stage failure. The batch driver checks these by variant,
/// never by message text.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The extension is neither PDF nor one of the convertible office formats.
    #[error("Unsupported file type: {name}")]
    UnsupportedType { name: String },

    /// The office-to-PDF conversion tool failed or produced no PDF.
    #[error("Failed to convert {name} to PDF: {detail}")]
    ConversionFailed { name: String, detail: String },

    /// The PDF could not be opened or its text could not be read.
    #[error("Failed to extract text from {name}: {detail}")]
    ExtractionFailed { name: String, detail: String },

    /// The model process failed or returned nothing usable.
    #[error("LLM failed: {detail}")]
    ClassificationFailed { detail: String },

    /// The model process did not answer before the deadline.
    #[error("LLM timed out after {secs}s")]
    ClassificationTimeout { secs: u64 },

    /// Sanitising the model's answer left nothing to use as a file name.
    #[error("Classification {classification:?} yields an empty file name")]
    EmptyFileName { classification: String },

    /// Another document already owns the destination name.
    #[error("Rename failed: '{}' already exists", destination.display())]
    DestinationExists { destination: PathBuf },

    /// The filesystem refused the move (permissions, cross-device, …).
    #[error("Rename failed: {detail}")]
    RenameFailed { destination: PathBuf, detail: String },
}

impl FileError {
    /// `true` when the file was skipped on purpose rather than failing.
    pub fn is_skip(&self) -> bool {
        matches!(self, FileError::UnsupportedType { .. })
    }
}
