//! End-to-end tests for dlibri.
//!
//! Most tests run the whole batch against temporary folders with a mocked
//! classifier and PDFs generated in memory with `lopdf`, so they need neither
//! LibreOffice nor a model runtime.
//!
//! Tests that drive the real tools are gated behind `E2E_ENABLED`:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use dlibri::pipeline::extract::extract_text;
use dlibri::{
    make_safe_filename, process_folder, process_folder_sync, process_folder_with,
    BatchProgressCallback, Classifier, FileError, LibrarianConfig, LibriError,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Write a one-page PDF showing `line` in Helvetica.
fn write_pdf(path: &Path, line: &str) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

/// Temporary `input/` + `output/` pair and a config pointing at them.
fn workspace() -> (TempDir, PathBuf, PathBuf, LibrarianConfig) {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input-files");
    let output = tmp.path().join("output-files");
    std::fs::create_dir_all(&input).unwrap();
    let config = LibrarianConfig::builder()
        .input_dir(&input)
        .output_dir(&output)
        .build()
        .expect("valid config");
    (tmp, input, output, config)
}

/// Classifier returning a fixed answer and recording what it was shown.
struct MockClassifier {
    answer: Result<String, FileError>,
    seen: Mutex<Vec<String>>,
}

impl MockClassifier {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(error: FileError) -> Self {
        Self {
            answer: Err(error),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, text: &str) -> Result<String, FileError> {
        self.seen.lock().unwrap().push(text.to_string());
        self.answer.clone()
    }
}

// ── Stage tests (no external tools) ──────────────────────────────────────────

#[test]
fn test_safe_filename_example() {
    assert_eq!(
        make_safe_filename("005: CS/AI - Intro*to|LLMs"),
        "005 CSAI - IntrotoLLMs"
    );
}

#[tokio::test]
async fn test_extract_full_text() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("test.pdf");
    write_pdf(&pdf, "This is a test PDF document.");

    let text = extract_text(&pdf).await.expect("extraction should succeed");
    assert!(text.contains("This is a test PDF document."), "got: {text:?}");
}

// ── Batch tests with a mocked classifier ─────────────────────────────────────

#[tokio::test]
async fn test_pdf_is_renamed_into_output_folder() {
    let (_tmp, input, output, config) = workspace();
    let original = input.join("original.pdf");
    write_pdf(&original, "AI and machine learning content");

    let classifier = MockClassifier::answering("005 Computer Science - ML Basics");
    let result = process_folder_with(&config, &classifier)
        .await
        .expect("batch should run");

    let expected = output.join("005 Computer Science - ML Basics.pdf");
    assert!(expected.exists(), "renamed file missing");
    assert!(!original.exists(), "original should have moved");
    assert_eq!(result.stats.total_files, 1);
    assert_eq!(result.stats.renamed_files, 1);
    assert_eq!(result.files[0].destination.as_deref(), Some(expected.as_path()));
    assert_eq!(
        result.files[0].classification.as_deref(),
        Some("005 Computer Science - ML Basics")
    );

    let seen = classifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("machine learning"));
}

#[tokio::test]
async fn test_answer_is_sanitised_before_rename() {
    let (_tmp, input, output, config) = workspace();
    write_pdf(&input.join("paper.pdf"), "Transformers");

    let classifier = MockClassifier::answering("005: CS/AI - Intro*to|LLMs\nBecause it is about LLMs.");
    process_folder_with(&config, &classifier).await.unwrap();

    assert!(output.join("005 CSAI - IntrotoLLMs.pdf").exists());
}

#[tokio::test]
async fn test_failed_classification_leaves_file_in_place() {
    let (_tmp, input, output, config) = workspace();
    let original = input.join("original.pdf");
    write_pdf(&original, "Some content");

    let classifier = MockClassifier::failing(FileError::ClassificationTimeout { secs: 600 });
    let result = process_folder_with(&config, &classifier).await.unwrap();

    assert!(original.exists(), "source must stay where it was");
    assert!(!output.exists(), "nothing should have been written");
    assert_eq!(result.stats.failed_files, 1);
    assert_eq!(result.stats.renamed_files, 0);
    assert!(matches!(
        result.files[0].error,
        Some(FileError::ClassificationTimeout { secs: 600 })
    ));
}

#[tokio::test]
async fn test_unsupported_file_is_skipped_and_batch_continues() {
    let (_tmp, input, output, config) = workspace();
    std::fs::write(input.join("photo.jpg"), b"\xff\xd8\xff\xe0").unwrap();
    write_pdf(&input.join("notes.pdf"), "Cooking recipes");

    let classifier = MockClassifier::answering("641 Food and Drink - Recipes");
    let result = process_folder_with(&config, &classifier).await.unwrap();

    assert!(input.join("photo.jpg").exists());
    assert!(!input.join("photo.pdf").exists(), "no PDF for unsupported types");
    assert!(output.join("641 Food and Drink - Recipes.pdf").exists());
    assert_eq!(result.stats.total_files, 2);
    assert_eq!(result.stats.skipped_files, 1);
    assert_eq!(result.stats.renamed_files, 1);
    assert_eq!(result.stats.failed_files, 0);
}

#[tokio::test]
async fn test_nested_folders_are_scanned() {
    let (_tmp, input, output, config) = workspace();
    write_pdf(&input.join("a/b/deep.pdf"), "Deeply nested");

    let classifier = MockClassifier::answering("900 History - Deep Time");
    process_folder_with(&config, &classifier).await.unwrap();

    assert!(output.join("900 History - Deep Time.pdf").exists());
    assert!(!input.join("a/b/deep.pdf").exists());
}

#[tokio::test]
async fn test_identical_classifications_do_not_overwrite() {
    let (_tmp, input, output, config) = workspace();
    write_pdf(&input.join("first.pdf"), "One");
    write_pdf(&input.join("second.pdf"), "Two");

    let classifier = MockClassifier::answering("005 Computer Science - Same");
    let result = process_folder_with(&config, &classifier).await.unwrap();

    assert!(output.join("005 Computer Science - Same.pdf").exists());
    assert_eq!(result.stats.renamed_files, 1);
    assert_eq!(result.stats.failed_files, 1);
    // Files are processed in sorted order: first.pdf wins.
    assert!(!input.join("first.pdf").exists());
    assert!(input.join("second.pdf").exists());
    assert!(matches!(
        result.files[1].error,
        Some(FileError::DestinationExists { .. })
    ));
}

#[tokio::test]
async fn test_progress_callback_sees_every_file() {
    #[derive(Default)]
    struct Counts {
        total: AtomicUsize,
        started: AtomicUsize,
        completed: AtomicUsize,
        errored: AtomicUsize,
        renamed: AtomicUsize,
    }

    impl BatchProgressCallback for Counts {
        fn on_batch_start(&self, total_files: usize) {
            self.total.store(total_files, Ordering::SeqCst);
        }
        fn on_file_start(&self, _index: usize, _total: usize, _path: &Path) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_file_complete(&self, _index: usize, _total: usize, _destination: &Path) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_file_error(&self, _index: usize, _total: usize, _path: &Path, _error: &FileError) {
            self.errored.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _total_files: usize, renamed_count: usize) {
            self.renamed.store(renamed_count, Ordering::SeqCst);
        }
    }

    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    write_pdf(&input.join("doc.pdf"), "Astronomy");
    std::fs::write(input.join("song.mp3"), b"ID3").unwrap();

    let counts = Arc::new(Counts::default());
    let config = LibrarianConfig::builder()
        .input_dir(&input)
        .output_dir(tmp.path().join("out"))
        .progress_callback(counts.clone() as Arc<dyn BatchProgressCallback>)
        .build()
        .unwrap();

    process_folder_with(&config, &MockClassifier::answering("520 Astronomy - Stars"))
        .await
        .unwrap();

    assert_eq!(counts.total.load(Ordering::SeqCst), 2);
    assert_eq!(counts.started.load(Ordering::SeqCst), 2);
    assert_eq!(counts.completed.load(Ordering::SeqCst), 1);
    assert_eq!(counts.errored.load(Ordering::SeqCst), 1);
    assert_eq!(counts.renamed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_input_folder_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let config = LibrarianConfig::builder()
        .input_dir(tmp.path().join("nope"))
        .output_dir(tmp.path().join("out"))
        .build()
        .unwrap();

    let err = process_folder(&config).await.unwrap_err();
    assert!(matches!(err, LibriError::InputFolderNotFound { .. }));
}

#[test]
fn test_sync_wrapper_reports_missing_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let config = LibrarianConfig::builder()
        .input_dir(tmp.path().join("nope"))
        .output_dir(tmp.path().join("out"))
        .build()
        .unwrap();

    assert!(process_folder_sync(&config).is_err());
}

// ── Model process (shell stand-in, unix only) ────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn test_command_classifier_end_to_end() {
    let (_tmp, input, output, _) = workspace();
    write_pdf(&input.join("original.pdf"), "Neural networks");

    let config = LibrarianConfig::builder()
        .input_dir(&input)
        .output_dir(&output)
        .classifier_command("sh")
        .classifier_args(["-c", "cat > /dev/null; echo '005 Computer Science - ML Basics'"])
        .build()
        .unwrap();

    let result = process_folder(&config).await.unwrap();
    assert_eq!(result.stats.renamed_files, 1);
    assert!(output.join("005 Computer Science - ML Basics.pdf").exists());
}

// ── Real tools (gated) ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_libreoffice_and_ollama() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }

    let (_tmp, input, output, config) = workspace();
    std::fs::write(
        input.join("intro.txt"),
        "An introduction to large language models, transformers and attention.",
    )
    .unwrap();

    let result = process_folder(&config).await.expect("batch should run");
    println!("{}", serde_json::to_string_pretty(&result).unwrap());

    assert_eq!(result.stats.total_files, 1);
    assert_eq!(result.stats.renamed_files, 1, "{:?}", result.files[0].error);
    let dest = result.files[0].destination.clone().unwrap();
    assert!(dest.starts_with(&output));
    assert!(dest.exists());
}
