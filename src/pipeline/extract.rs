//! PDF text extraction via `lopdf`.
//!
//! Parsing is CPU-bound and synchronous, so it runs on the blocking pool via
//! `tokio::task::spawn_blocking`, the same way the async pipeline keeps every
//! other blocking step off the runtime threads.

use crate::error::FileError;
use crate::pipeline::convert::file_name;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the text of every page of `pdf_path`, pages joined with `\n`,
/// surrounding whitespace trimmed.
pub async fn extract_text(pdf_path: &Path) -> Result<String, FileError> {
    let path = pdf_path.to_path_buf();
    let name = file_name(pdf_path);

    tokio::task::spawn_blocking(move || extract_text_blocking(&path))
        .await
        .map_err(|e| FileError::ExtractionFailed {
            name,
            detail: format!("extraction task panicked: {e}"),
        })?
}

/// Blocking implementation of [`extract_text`].
pub fn extract_text_blocking(pdf_path: &Path) -> Result<String, FileError> {
    let name = file_name(pdf_path);
    let document = Document::load(pdf_path).map_err(|e| FileError::ExtractionFailed {
        name: name.clone(),
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for &page_num in pages.keys() {
        let text = document
            .extract_text(&[page_num])
            .map_err(|e| FileError::ExtractionFailed {
                name: name.clone(),
                detail: format!("page {page_num}: {e}"),
            })?;
        texts.push(text);
    }

    let text = texts.join("\n").trim().to_string();
    if text.is_empty() {
        warn!("{} has no extractable text (scanned?)", name);
    }
    debug!("Extracted {} chars from {} pages of {}", text.chars().count(), pages.len(), name);
    Ok(text)
}
