//! File naming: sanitise the model's answer and move the PDF.
//!
//! Sanitising keeps only the first line of the answer, removes the characters
//! `\ / * ? : " < > |` and trims surrounding whitespace. The result plus
//! `.pdf` becomes the file name inside the output folder.

use crate::error::FileError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

static FORBIDDEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());

/// Make `name` safe to use as a file name.
///
/// Idempotent: `make_safe_filename(&make_safe_filename(s)) == make_safe_filename(s)`.
pub fn make_safe_filename(name: &str) -> String {
    let first_line = name.split('\n').next().unwrap_or("");
    FORBIDDEN.replace_all(first_line, "").trim().to_string()
}

/// Where a PDF classified as `classification` goes inside `output_dir`.
pub fn destination_for(classification: &str, output_dir: &Path) -> Result<PathBuf, FileError> {
    let stem = make_safe_filename(classification);
    if stem.is_empty() {
        return Err(FileError::EmptyFileName {
            classification: classification.to_string(),
        });
    }
    Ok(output_dir.join(format!("{stem}.pdf")))
}

/// Move `pdf_path` into `output_dir` under the name derived from
/// `classification`. The output folder is created if absent; an existing
/// destination is never overwritten.
pub async fn rename_pdf(
    pdf_path: &Path,
    classification: &str,
    output_dir: &Path,
) -> Result<PathBuf, FileError> {
    let destination = destination_for(classification, output_dir)?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| FileError::RenameFailed {
            destination: destination.clone(),
            detail: format!("cannot create '{}': {}", output_dir.display(), e),
        })?;

    if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
        return Err(FileError::DestinationExists { destination });
    }

    tokio::fs::rename(pdf_path, &destination)
        .await
        .map_err(|e| FileError::RenameFailed {
            destination: destination.clone(),
            detail: e.to_string(),
        })?;

    info!(
        "Renamed to: {}",
        destination.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(destination)
}
