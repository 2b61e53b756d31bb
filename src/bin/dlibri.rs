//! CLI binary for dlibri.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `LibrarianConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use dlibri::{
    process_folder, BatchProgressCallback, FileError, LibrarianConfig, LibriError,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch, one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Wall-clock start of the file currently in the pipeline.
    file_start: Mutex<Option<Instant>>,
    failures: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Classifying");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            file_start: Mutex::new(None),
            failures: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_start
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        if let Ok(mut t) = self.file_start.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(name_of(path));
    }

    fn on_file_complete(&self, _index: usize, _total: usize, destination: &Path) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            name_of(destination),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, _total: usize, path: &Path, error: &FileError) {
        let secs = self.elapsed_secs();
        let mark = if error.is_skip() {
            yellow("–")
        } else {
            self.failures.fetch_add(1, Ordering::SeqCst);
            red("✗")
        };

        // Truncate very long error messages to keep output tidy.
        let msg = error.to_string();
        let msg = match msg.char_indices().nth(100) {
            Some((i, _)) => format!("{}\u{2026}", &msg[..i]),
            None => msg,
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            mark,
            name_of(path),
            if error.is_skip() { dim(&msg) } else { red(&msg) },
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, renamed_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.failures.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} files renamed{}",
            if failed == 0 { green("✔") } else { red("⚠") },
            bold(&renamed_count.to_string()),
            total_files,
            if failed == 0 {
                String::new()
            } else {
                format!("  ({} failed)", red(&failed.to_string()))
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Classify everything under ./input-files into ./output-files
  dlibri

  # Other folders
  dlibri --input ~/Downloads/papers --output ~/Library/sorted

  # Another local model
  dlibri --model llama3

  # Classify through an API provider instead of the local model process
  dlibri --provider openai --model gpt-4.1-nano

  # Machine-readable report
  dlibri --json > report.json

REQUIREMENTS:
  libreoffice   on PATH, for .docx .doc .pptx .ppt .xlsx .xls .txt
  ollama        on PATH with the model pulled (ollama pull mistral)

Files that fail are left in the input folder. Unsupported types are skipped.
"#;

/// Rename documents after their Dewey category and title, using a local LLM.
#[derive(Parser, Debug)]
#[command(
    name = "dlibri",
    version,
    about = "Rename documents after their Dewey category and title, using a local LLM",
    long_about = "Convert every document under the input folder to PDF, extract its text, \
ask a local language model for a Dewey Decimal category and a short title, and move the PDF \
into the output folder under that name.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder scanned recursively for documents.
    #[arg(short, long, env = "DLIBRI_INPUT", default_value = dlibri::config::DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Folder receiving the renamed PDFs.
    #[arg(short, long, env = "DLIBRI_OUTPUT", default_value = dlibri::config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Model identifier passed to the model runtime (or provider).
    #[arg(short, long, env = "DLIBRI_MODEL", default_value = "mistral")]
    model: String,

    /// Program serving the model; invoked as `<cmd> run <model>`.
    #[arg(long, env = "DLIBRI_CLASSIFIER_COMMAND", default_value = "ollama")]
    classifier_command: String,

    /// Office-to-PDF conversion program.
    #[arg(long, env = "DLIBRI_OFFICE_COMMAND", default_value = "libreoffice")]
    office_command: String,

    /// Deadline for one classification, in seconds.
    #[arg(long, env = "DLIBRI_TIMEOUT", default_value_t = 600,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Characters of extracted text sent to the model.
    #[arg(long, env = "DLIBRI_MAX_CHARS", default_value_t = 3000)]
    max_chars: usize,

    /// Classify through an edgequake-llm provider (openai, anthropic, gemini, ollama, …).
    #[arg(long, env = "DLIBRI_PROVIDER")]
    provider: Option<String>,

    /// Path to a text file with a custom prompt containing `{text}`.
    #[arg(long, env = "DLIBRI_PROMPT")]
    prompt: Option<PathBuf>,

    /// Output a structured JSON report (BatchOutput) on stdout.
    #[arg(long, env = "DLIBRI_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DLIBRI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DLIBRI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DLIBRI_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces the per-file INFO lines when it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run batch ────────────────────────────────────────────────────────
    let output = match process_folder(&config).await {
        Ok(output) => output,
        Err(e @ LibriError::InputFolderNotFound { .. }) => {
            println!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e).context("Batch failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        let s = &output.stats;
        eprintln!(
            "Renamed {}/{} files in {}ms ({} skipped, {} failed)",
            s.renamed_files, s.total_files, s.total_duration_ms, s.skipped_files, s.failed_files
        );
    }

    Ok(())
}

/// Map CLI args to `LibrarianConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<LibrarianConfig> {
    let mut builder = LibrarianConfig::builder()
        .input_dir(&cli.input)
        .output_dir(&cli.output)
        .model(&cli.model)
        .classifier_command(&cli.classifier_command)
        .office_command(&cli.office_command)
        .classify_timeout_secs(cli.timeout)
        .max_excerpt_chars(cli.max_chars);

    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }

    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
