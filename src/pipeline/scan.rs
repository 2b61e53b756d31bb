//! Input discovery: list the documents under the input folder.
//!
//! The walk is done once, up front. PDFs the converter writes next to their
//! sources during the run are therefore never picked up as new inputs.
//!
//! Only the input folder itself must be readable. A subfolder or entry that
//! cannot be read is logged and left out. Symlinks to files are followed;
//! symlinks to folders are not, so the walk cannot loop.

use crate::error::LibriError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Recursively collect candidate files under `input_dir`, sorted by path.
///
/// A candidate is a regular file whose name contains a `.` and does not start
/// with one (hidden files and office lock files such as `.~lock.x.docx#` are
/// ignored). Anything under `exclude` is skipped, which keeps an output folder
/// nested inside the input folder out of the batch.
pub fn scan_input(input_dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, LibriError> {
    if !input_dir.is_dir() {
        return Err(LibriError::InputFolderNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    walk(input_dir, exclude, &mut files)?;
    files.sort();
    debug!("Found {} candidate files in {}", files.len(), input_dir.display());
    Ok(files)
}

fn walk(dir: &Path, exclude: Option<&Path>, files: &mut Vec<PathBuf>) -> Result<(), LibriError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LibriError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();

        if exclude.is_some_and(|ex| path == ex) {
            debug!("Skipping output folder {}", path.display());
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            warn!("Skipping {}: cannot read file type", path.display());
            continue;
        };
        if file_type.is_dir() {
            if let Err(e) = walk(&path, exclude, files) {
                warn!("Skipping folder: {}", e);
            }
        } else if is_regular_file(&path, file_type) && is_candidate(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_regular_file(path: &Path, file_type: std::fs::FileType) -> bool {
    if file_type.is_symlink() {
        // Follow the link; dangling links and links to folders are dropped.
        return std::fs::metadata(path).is_ok_and(|m| m.is_file());
    }
    file_type.is_file()
}

fn is_candidate(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => !name.starts_with('.') && name.contains('.'),
        None => false,
    }
}
