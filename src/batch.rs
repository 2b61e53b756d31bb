//! Batch entry points: run every file of the input folder through the
//! pipeline, one at a time.
//!
//! Only problems with the batch itself (missing input folder, bad config,
//! unusable provider) are returned as `Err`. A file that fails in any stage is
//! recorded in its [`FileOutcome`], left where it was, and the batch moves on.

use crate::config::LibrarianConfig;
use crate::error::{FileError, LibriError};
use crate::output::{BatchOutput, FileOutcome};
use crate::pipeline::classify::{Classifier, CommandClassifier, ProviderClassifier};
use crate::pipeline::convert::{ensure_pdf, file_name, Document};
use crate::pipeline::{extract, rename, scan};
use edgequake_llm::ProviderFactory;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Classify and rename every document under `config.input_dir`.
///
/// # Returns
/// `Ok(BatchOutput)` once every file has been attempted, even if some failed
/// (check `output.stats.failed_files`).
///
/// # Errors
/// - The input folder does not exist or cannot be listed
/// - The configured LLM provider cannot be created
pub async fn process_folder(config: &LibrarianConfig) -> Result<BatchOutput, LibriError> {
    let classifier = resolve_classifier(config)?;
    process_folder_with(config, classifier.as_ref()).await
}

/// Like [`process_folder`], with a caller-supplied classifier.
pub async fn process_folder_with(
    config: &LibrarianConfig,
    classifier: &dyn Classifier,
) -> Result<BatchOutput, LibriError> {
    let batch_start = Instant::now();
    let files = scan::scan_input(&config.input_dir, Some(&config.output_dir))?;
    let total = files.len();
    info!(
        "Found {} files in {} (classifier: {})",
        total,
        config.input_dir.display(),
        classifier.describe()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for (i, path) in files.into_iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &path);
        }

        let outcome = process_file(&path, classifier, config).await;

        if let Some(ref cb) = config.progress_callback {
            match (&outcome.error, &outcome.destination) {
                (Some(e), _) => cb.on_file_error(index, total, &outcome.source, e),
                (None, Some(dest)) => cb.on_file_complete(index, total, dest),
                (None, None) => {}
            }
        }
        outcomes.push(outcome);
    }

    let output = BatchOutput::from_outcomes(outcomes, batch_start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {}/{} renamed, {} skipped, {} failed, {}ms total",
        output.stats.renamed_files,
        output.stats.total_files,
        output.stats.skipped_files,
        output.stats.failed_files,
        output.stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(output.stats.total_files, output.stats.renamed_files);
    }

    Ok(output)
}

/// Run one file through convert → extract → classify → rename.
///
/// Never fails: the first stage error ends the pass and is stored in
/// `outcome.error`.
pub async fn process_file(
    path: &Path,
    classifier: &dyn Classifier,
    config: &LibrarianConfig,
) -> FileOutcome {
    let start = Instant::now();
    let mut outcome = FileOutcome::new(path.to_path_buf());

    if let Err(e) = run_stages(path, classifier, config, &mut outcome).await {
        if e.is_skip() {
            debug!("{}", e);
        } else {
            warn!("{}", e);
        }
        outcome.error = Some(e);
    }

    outcome.duration_ms = start.elapsed().as_millis() as u64;
    if outcome.pdf_path.is_some() {
        info!(
            "Processed {} in {:.2} seconds",
            file_name(outcome.pdf_path.as_deref().unwrap_or(path)),
            outcome.duration_ms as f64 / 1000.0
        );
    }
    outcome
}

async fn run_stages(
    path: &Path,
    classifier: &dyn Classifier,
    config: &LibrarianConfig,
    outcome: &mut FileOutcome,
) -> Result<(), FileError> {
    // ── Step 1: Convert ──────────────────────────────────────────────────
    let mut doc = Document::new(path);
    let pdf = ensure_pdf(&mut doc, &config.office_command).await?;
    outcome.pdf_path = Some(pdf.clone());
    info!("Processing file: {}", file_name(&pdf));

    // ── Step 2: Extract ──────────────────────────────────────────────────
    let text = extract::extract_text(&pdf).await?;

    // ── Step 3: Classify ─────────────────────────────────────────────────
    let classification = classifier.classify(&text).await?;
    debug!("{} classified as {:?}", file_name(&pdf), classification);
    outcome.classification = Some(classification.clone());

    // ── Step 4: Rename ───────────────────────────────────────────────────
    let destination = rename::rename_pdf(&pdf, &classification, &config.output_dir).await?;
    outcome.destination = Some(destination);
    Ok(())
}

/// Blocking wrapper around [`process_folder`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_folder_sync(config: &LibrarianConfig) -> Result<BatchOutput, LibriError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| LibriError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_folder(config))
}

/// Pick the classification backend, from most to least specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`): created through
///    [`ProviderFactory::create_llm_provider`] with `config.model`; the
///    factory reads the matching API key from the environment.
/// 3. **Model process**: `config.classifier_command` with
///    `config.classifier_args()`, i.e. `ollama run mistral` by default.
pub fn resolve_classifier(config: &LibrarianConfig) -> Result<Arc<dyn Classifier>, LibriError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderClassifier::new(Arc::clone(provider), config)));
    }

    if let Some(ref name) = config.provider_name {
        let provider = ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
            LibriError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        })?;
        return Ok(Arc::new(ProviderClassifier::new(provider, config)));
    }

    Ok(Arc::new(CommandClassifier::from_config(config)))
}
