//! # dlibri
//!
//! Classify a folder of documents with a local language model and rename each
//! one after its Dewey Decimal category and a short title, e.g.
//! `005 Computer Science - Generative AI and LLMs.pdf`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input-files/
//!  │
//!  ├─ 1. Scan      recursive walk, snapshotted before any file is touched
//!  ├─ 2. Convert   .docx/.doc/.pptx/.ppt/.xlsx/.xls/.txt → PDF via LibreOffice
//!  ├─ 3. Extract   text of every page (lopdf, spawn_blocking)
//!  ├─ 4. Classify  `ollama run mistral`, prompt on stdin, 10 min deadline
//!  └─ 5. Rename    sanitised answer + ".pdf" → output-files/
//! ```
//!
//! Files are processed strictly one after another. A file that fails any
//! stage is left in place and reported in its [`FileOutcome`]; the batch
//! itself only fails when it cannot start.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dlibri::{process_folder, LibrarianConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LibrarianConfig::builder()
//!         .input_dir("input-files")
//!         .output_dir("output-files")
//!         .build()?;
//!     let output = process_folder(&config).await?;
//!     for file in &output.files {
//!         if let Some(ref dest) = file.destination {
//!             println!("{} → {}", file.source.display(), dest.display());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `dlibri` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{process_file, process_folder, process_folder_sync, process_folder_with, resolve_classifier};
pub use config::{LibrarianConfig, LibrarianConfigBuilder};
pub use error::{FileError, LibriError};
pub use output::{BatchOutput, BatchStats, FileOutcome};
pub use pipeline::classify::{Classifier, CommandClassifier, ProviderClassifier};
pub use pipeline::convert::{Document, DocumentKind};
pub use pipeline::rename::make_safe_filename;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
