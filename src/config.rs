//! Configuration for a batch classification run.
//!
//! Every knob of a run lives in [`LibrarianConfig`], built via its
//! [`LibrarianConfigBuilder`]. Folder paths are passed explicitly rather than
//! read from process-wide constants, so tests and library callers can point
//! the pipeline at temporary directories.
//!
//! `LibrarianConfig::default()` reproduces the stock behaviour: read from
//! `input-files/`, write to `output-files/`, convert with `libreoffice`,
//! classify with `ollama run mistral`, ten-minute deadline, 3000-character
//! excerpt.

use crate::error::LibriError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Default input folder, relative to the working directory.
pub const DEFAULT_INPUT_DIR: &str = "input-files";

/// Default output folder, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output-files";

/// Configuration for a batch run.
///
/// Built via [`LibrarianConfig::builder()`] or using
/// [`LibrarianConfig::default()`].
///
/// # Example
/// ```rust
/// use dlibri::LibrarianConfig;
///
/// let config = LibrarianConfig::builder()
///     .input_dir("scans")
///     .output_dir("library")
///     .model("llama3")
///     .build()
///     .unwrap();
/// assert_eq!(config.classifier_args(), vec!["run", "llama3"]);
/// ```
#[derive(Clone)]
pub struct LibrarianConfig {
    /// Folder scanned recursively for documents. Default: `input-files`.
    pub input_dir: PathBuf,

    /// Folder receiving the renamed PDFs; created on first rename.
    /// Default: `output-files`.
    pub output_dir: PathBuf,

    /// Model identifier passed to the model runtime. Default: `mistral`.
    pub model: String,

    /// Program that serves the model. Default: `ollama`.
    pub classifier_command: String,

    /// Arguments for `classifier_command`. `None` means `["run", <model>]`.
    pub classifier_args: Option<Vec<String>>,

    /// Office-to-PDF conversion program. Default: `libreoffice`.
    pub office_command: String,

    /// Deadline for one classification call in seconds. Default: 600.
    pub classify_timeout_secs: u64,

    /// Number of leading characters of the extracted text sent to the model.
    /// Default: 3000.
    pub max_excerpt_chars: usize,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama"). When set,
    /// classification goes through `edgequake-llm` instead of the model
    /// process.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for provider-backed classification. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens a provider may generate for the answer. Default: 64.
    pub max_tokens: usize,

    /// Custom classification prompt. Must contain `{text}`. If None, uses
    /// [`crate::prompts::CLASSIFICATION_PROMPT`].
    pub prompt: Option<String>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model: "mistral".to_string(),
            classifier_command: "ollama".to_string(),
            classifier_args: None,
            office_command: "libreoffice".to_string(),
            classify_timeout_secs: 600,
            max_excerpt_chars: 3000,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 64,
            prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for LibrarianConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibrarianConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("model", &self.model)
            .field("classifier_command", &self.classifier_command)
            .field("classifier_args", &self.classifier_args)
            .field("office_command", &self.office_command)
            .field("classify_timeout_secs", &self.classify_timeout_secs)
            .field("max_excerpt_chars", &self.max_excerpt_chars)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt", &self.prompt.as_ref().map(|p| p.len()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl LibrarianConfig {
    /// Create a new builder for `LibrarianConfig`.
    pub fn builder() -> LibrarianConfigBuilder {
        LibrarianConfigBuilder {
            config: Self::default(),
        }
    }

    /// Arguments handed to the model process.
    pub fn classifier_args(&self) -> Vec<String> {
        match self.classifier_args {
            Some(ref args) => args.clone(),
            None => vec!["run".to_string(), self.model.clone()],
        }
    }
}

/// Builder for [`LibrarianConfig`].
#[derive(Debug)]
pub struct LibrarianConfigBuilder {
    config: LibrarianConfig,
}

impl LibrarianConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn classifier_command(mut self, program: impl Into<String>) -> Self {
        self.config.classifier_command = program.into();
        self
    }

    /// Replace the default `["run", <model>]` argument list.
    pub fn classifier_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.classifier_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn office_command(mut self, program: impl Into<String>) -> Self {
        self.config.office_command = program.into();
        self
    }

    pub fn classify_timeout_secs(mut self, secs: u64) -> Self {
        self.config.classify_timeout_secs = secs;
        self
    }

    pub fn max_excerpt_chars(mut self, n: usize) -> Self {
        self.config.max_excerpt_chars = n;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<LibrarianConfig, LibriError> {
        let c = &self.config;
        if c.classify_timeout_secs == 0 {
            return Err(LibriError::InvalidConfig(
                "Classification timeout must be ≥ 1s".into(),
            ));
        }
        if c.max_excerpt_chars == 0 {
            return Err(LibriError::InvalidConfig(
                "Excerpt length must be ≥ 1 character".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(LibriError::InvalidConfig("Model name is empty".into()));
        }
        if c.classifier_command.trim().is_empty() || c.office_command.trim().is_empty() {
            return Err(LibriError::InvalidConfig(
                "External commands must not be empty".into(),
            ));
        }
        if same_folder(&c.input_dir, &c.output_dir) {
            return Err(LibriError::InvalidConfig(format!(
                "Input and output folders must differ, both are '{}'",
                c.input_dir.display()
            )));
        }
        if let Some(ref p) = c.prompt {
            if !p.contains("{text}") {
                return Err(LibriError::InvalidConfig(
                    "Custom prompt must contain the {text} placeholder".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

/// Whether `a` and `b` name the same folder. Existing folders are compared
/// after canonicalisation; otherwise `.` segments are ignored.
fn same_folder(a: &Path, b: &Path) -> bool {
    if let (Ok(a), Ok(b)) = (a.canonicalize(), b.canonicalize()) {
        return a == b;
    }
    let lexical = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    lexical(a) == lexical(b)
}
