//! Document classification: ask a model for `"<category> - <title>"`.
//!
//! The default backend is [`CommandClassifier`]: it starts the model runtime
//! (`ollama run mistral`), writes the prompt to its stdin and reads the
//! answer from stdout. [`ProviderClassifier`] sends the same prompt through an
//! `edgequake-llm` provider instead. Both make a single attempt bounded by
//! the configured deadline; there is no retry.
//!
//! The [`Classifier`] trait is the seam the batch driver works against, so
//! callers and tests can plug in their own backend.

use crate::config::LibrarianConfig;
use crate::error::FileError;
use crate::prompts::build_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Turns extracted document text into a one-line classification.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `text`. Implementations decide how much of it to send.
    ///
    /// Returns the trimmed answer, e.g. `"005 Computer Science - ML Basics"`.
    async fn classify(&self, text: &str) -> Result<String, FileError>;

    /// Short label for logs.
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

// ── Model process ────────────────────────────────────────────────────────

/// Classifier backed by a local model process.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    max_excerpt_chars: usize,
    prompt: Option<String>,
}

impl CommandClassifier {
    /// Build from the command, arguments, deadline and prompt settings of
    /// `config`.
    pub fn from_config(config: &LibrarianConfig) -> Self {
        Self {
            program: config.classifier_command.clone(),
            args: config.classifier_args(),
            timeout: Duration::from_secs(config.classify_timeout_secs),
            max_excerpt_chars: config.max_excerpt_chars,
            prompt: config.prompt.clone(),
        }
    }

    /// Override the deadline (tests use sub-second values).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, prompt: String) -> Result<std::process::Output, FileError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FileError::ClassificationFailed {
                detail: format!("could not run '{}': {}", self.program, e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| FileError::ClassificationFailed {
            detail: "model process has no stdin".to_string(),
        })?;

        // Feed stdin while draining stdout so neither pipe can fill up and
        // stall the other side.
        let feed = async move {
            let written = stdin.write_all(prompt.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(FileError::ClassificationFailed {
                    detail: format!("failed to send prompt: {e}"),
                });
            }
            debug!("Model process closed stdin early");
        }

        output.map_err(|e| FileError::ClassificationFailed {
            detail: format!("failed to read model output: {e}"),
        })
    }
}

#[async_trait]
impl Classifier for CommandClassifier {
    async fn classify(&self, text: &str) -> Result<String, FileError> {
        let prompt = build_prompt(self.prompt.as_deref(), text, self.max_excerpt_chars);
        let start = Instant::now();
        debug!("Running {} {:?} ({} prompt bytes)", self.program, self.args, prompt.len());

        // Dropping the timed-out future drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, self.run(prompt))
            .await
            .map_err(|_| FileError::ClassificationTimeout {
                secs: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FileError::ClassificationFailed {
                detail: format!("'{}' exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Model answered in {:?}: {:?}", start.elapsed(), answer);
        non_empty(answer)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

// ── edgequake-llm provider ───────────────────────────────────────────────

/// Classifier backed by an `edgequake-llm` provider.
pub struct ProviderClassifier {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
    max_excerpt_chars: usize,
    prompt: Option<String>,
}

impl ProviderClassifier {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &LibrarianConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.classify_timeout_secs),
            max_excerpt_chars: config.max_excerpt_chars,
            prompt: config.prompt.clone(),
        }
    }
}

#[async_trait]
impl Classifier for ProviderClassifier {
    async fn classify(&self, text: &str) -> Result<String, FileError> {
        let prompt = build_prompt(self.prompt.as_deref(), text, self.max_excerpt_chars);
        ask_within(self.timeout, prompt, |prompt| async move {
            let messages = vec![ChatMessage::user(prompt)];
            let response = self
                .provider
                .chat(&messages, Some(&self.options))
                .await
                .map_err(|e| e.to_string())?;
            debug!(
                "Provider answered: {} input tokens, {} output tokens",
                response.prompt_tokens, response.completion_tokens
            );
            Ok::<_, String>(response.content)
        })
        .await
    }

    fn describe(&self) -> String {
        "edgequake-llm provider".to_string()
    }
}

/// Send `prompt` through `call` once, bounded by `timeout`, and return the
/// trimmed, non-empty answer.
async fn ask_within<F, Fut, E>(timeout: Duration, prompt: String, call: F) -> Result<String, FileError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, E>>,
    E: fmt::Display,
{
    let answer = tokio::time::timeout(timeout, call(prompt))
        .await
        .map_err(|_| FileError::ClassificationTimeout {
            secs: timeout.as_secs(),
        })?
        .map_err(|e| FileError::ClassificationFailed {
            detail: e.to_string(),
        })?;
    non_empty(answer.trim().to_string())
}

/// Build `CompletionOptions` from the batch config.
fn build_options(config: &LibrarianConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn non_empty(answer: String) -> Result<String, FileError> {
    if answer.is_empty() {
        Err(FileError::ClassificationFailed {
            detail: "model returned an empty response".to_string(),
        })
    } else {
        Ok(answer)
    }
}
