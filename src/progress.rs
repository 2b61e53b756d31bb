//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::LibrarianConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the input folder. The CLI uses this
//! to drive its progress bar; library callers can forward the events anywhere.
//!
//! # Example
//!
//! ```rust
//! use dlibri::{BatchProgressCallback, LibrarianConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     renamed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, destination: &Path) {
//!         self.renamed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} → {}", destination.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { renamed: AtomicUsize::new(0) });
//!
//! let config = LibrarianConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FileError;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch driver as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed one at a time, but the trait is
/// `Send + Sync` so implementations can be shared with other threads.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input folder has been scanned.
    ///
    /// # Arguments
    /// * `total_files` — number of files that will be attempted
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file enters the converter.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — number of files in the batch
    /// * `path`  — the source file
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a file has been renamed into the output folder.
    fn on_file_complete(&self, index: usize, total: usize, destination: &Path) {
        let _ = (index, total, destination);
    }

    /// Called when a file was skipped or failed in any stage.
    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &FileError) {
        let _ = (index, total, path, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// # Arguments
    /// * `total_files`   — number of files attempted
    /// * `renamed_count` — files that ended up in the output folder
    fn on_batch_complete(&self, total_files: usize, renamed_count: usize) {
        let _ = (total_files, renamed_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::LibrarianConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
