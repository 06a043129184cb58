//! Line-by-line, best-effort translation.
//!
//! Every line is sent to the backend on its own, which keeps requests under
//! backend length limits and confines failures to single lines. A line that
//! cannot be translated is kept in its original form.

mod google;
mod openai;

pub use google::GoogleBackend;
pub use openai::OpenAiBackend;

use crate::config::{ApiConfig, BackendKind, TranslationConfig};
use crate::console::Console;
use crate::error::TranslationError;
use crate::pacing::{Pacer, RetryPolicy, retry_async};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A translation service that handles one line at a time.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Translates a single non-empty line.
    async fn translate_line(
        &self,
        line: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Builds the backend selected in the configuration.
pub fn create_backend(
    config: &TranslationConfig,
    api: &ApiConfig,
) -> Result<Box<dyn TranslationBackend>, TranslationError> {
    let backend: Box<dyn TranslationBackend> = match config.backend {
        BackendKind::Google => Box::new(GoogleBackend::new()?),
        BackendKind::Openai => Box::new(OpenAiBackend::new(api.clone())?),
    };
    Ok(backend)
}

/// Translates chapter text line by line through a backend.
pub struct Translator {
    backend: Box<dyn TranslationBackend>,
    source_lang: String,
    target_lang: String,
    policy: RetryPolicy,
    line_delay: Duration,
    pacer: Arc<dyn Pacer>,
    console: Console,
}

impl Translator {
    /// Create a new Translator.
    pub fn new(
        backend: Box<dyn TranslationBackend>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        retries: u32,
        config: &TranslationConfig,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            backend,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            policy: RetryPolicy::fixed(retries, Duration::from_secs_f64(config.retry_delay_sec)),
            line_delay: Duration::from_secs_f64(config.line_delay_sec),
            pacer,
            console: Console::new(),
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Translates each line independently.
    ///
    /// The result always has the same length and order as `lines`. Blank
    /// lines are passed through without calling the backend, and lines that
    /// still fail after retries are returned untranslated.
    pub async fn translate(&self, lines: &[String]) -> Vec<String> {
        let mut translated = Vec::with_capacity(lines.len());
        let mut fallbacks = 0;

        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                translated.push(line.clone());
                continue;
            }

            match self.translate_line(line).await {
                Ok(text) => translated.push(text),
                Err(e) => {
                    self.console.warning(&format!(
                        "Translation error on line {}: {} (keeping original)",
                        idx + 1,
                        e
                    ));
                    fallbacks += 1;
                    translated.push(line.clone());
                }
            }

            self.pacer.pause(self.line_delay).await;
        }

        if fallbacks > 0 {
            self.console.warning(&format!(
                "{} of {} lines left untranslated",
                fallbacks,
                lines.len()
            ));
        }

        translated
    }

    async fn translate_line(&self, line: &str) -> Result<String, TranslationError> {
        let retried = retry_async(
            self.policy,
            self.pacer.as_ref(),
            TranslationError::is_transient,
            move |_| {
                self.backend
                    .translate_line(line, &self.source_lang, &self.target_lang)
            },
        )
        .await;

        // An empty answer would silently drop a line.
        match retried.result {
            Ok(text) if text.trim().is_empty() => Err(TranslationError::ParseError(
                "backend returned an empty translation".to_string(),
            )),
            other => other,
        }
    }
}
