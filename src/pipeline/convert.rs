//! Office-to-PDF conversion through an external tool (LibreOffice).
//!
//! PDFs pass through untouched. Office and plain-text formats are handed to
//! `<office_command> --headless --convert-to pdf --outdir <dir> <file>`, which
//! writes `<dir>/<stem>.pdf` next to the source. Anything else is skipped
//! without spawning a process.

use crate::error::FileError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info};

/// Extensions (lowercase, without dot) the conversion tool accepts.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["docx", "doc", "pptx", "ppt", "xlsx", "xls", "txt"];

/// What the pipeline does with a file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Already a PDF.
    Pdf,
    /// Convertible office or text document.
    Office,
    /// Anything else.
    Unsupported,
}

impl DocumentKind {
    /// Classify `path` by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some(e) if CONVERTIBLE_EXTENSIONS.contains(&e) => DocumentKind::Office,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// A file going through the pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    /// Where the file was found.
    pub original: PathBuf,
    pub kind: DocumentKind,
    /// The PDF produced (or reused) by [`ensure_pdf`].
    pub pdf: Option<PathBuf>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let original = path.into();
        let kind = DocumentKind::from_path(&original);
        Self {
            original,
            kind,
            pdf: None,
        }
    }

    pub(crate) fn display_name(&self) -> String {
        file_name(&self.original)
    }
}

/// Make sure `doc` has a PDF, converting it if needed.
///
/// Returns the PDF path and records it in `doc.pdf`.
pub async fn ensure_pdf(doc: &mut Document, office_command: &str) -> Result<PathBuf, FileError> {
    let pdf = match doc.kind {
        DocumentKind::Pdf => doc.original.clone(),
        DocumentKind::Office => convert_to_pdf(&doc.original, office_command).await?,
        DocumentKind::Unsupported => {
            info!("[SKIPPED] Unsupported file type: {}", doc.display_name());
            return Err(FileError::UnsupportedType {
                name: doc.display_name(),
            });
        }
    };
    doc.pdf = Some(pdf.clone());
    Ok(pdf)
}

/// Run the conversion tool on `input` and return the PDF it wrote.
async fn convert_to_pdf(input: &Path, office_command: &str) -> Result<PathBuf, FileError> {
    let name = file_name(input);
    let outdir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let expected = outdir.join(input.with_extension("pdf").file_name().unwrap_or_default());
    // A PDF left over from an earlier run must not pass for fresh output.
    let stale = modified_at(&expected).await;

    debug!(
        "Running {} --headless --convert-to pdf --outdir {} {}",
        office_command,
        outdir.display(),
        input.display()
    );

    let output = Command::new(office_command)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(&outdir)
        .arg(input)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| FileError::ConversionFailed {
            name: name.clone(),
            detail: format!("could not run '{}': {}", office_command, e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FileError::ConversionFailed {
            name,
            detail: format!("{} {}", output.status, stderr.trim()).trim().to_string(),
        });
    }

    let fresh = match (stale, modified_at(&expected).await) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(before), Some(after)) => after > before,
    };
    if !fresh {
        return Err(FileError::ConversionFailed {
            name,
            detail: format!("no PDF produced at '{}'", expected.display()),
        });
    }

    debug!("Converted {} → {}", input.display(), expected.display());
    Ok(expected)
}

/// Modification time of `path` if it is a regular file.
async fn modified_at(path: &Path) -> Option<SystemTime> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    if !meta.is_file() {
        return None;
    }
    meta.modified().ok()
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
