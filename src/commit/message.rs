//! Commit message generation with ordered model fallback.

use tracing::{debug, warn};

use crate::commit::prompt::build_commit_prompt;
use crate::error::ConfigError;
use crate::gemini::{ModelBackend, ModelOutcome};

/// Models tried in order, most capable first.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.0-flash"];

/// Message used when no model produced text.
pub const FALLBACK_MESSAGE: &str = "Commit automático";

/// A commit message chosen for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub text: String,
    /// Model that produced the text; `None` for the fallback message.
    pub model: Option<String>,
}

impl GeneratedMessage {
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_MESSAGE.to_string(),
            model: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.model.is_none()
    }

    /// First non-empty line of the message.
    pub fn title(&self) -> &str {
        self.text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Ask each model in turn for a commit message describing `diff`.
///
/// Returns the first non-empty text. A halting outcome (quota exhausted) or
/// running out of models yields [`FALLBACK_MESSAGE`]. A blank `language` is
/// rejected before any request is made.
pub async fn generate_commit_message<B, S>(
    backend: &B,
    models: &[S],
    language: &str,
    diff: &str,
) -> Result<GeneratedMessage, ConfigError>
where
    B: ModelBackend + ?Sized,
    S: AsRef<str>,
{
    if language.trim().is_empty() {
        return Err(ConfigError::BlankLanguage);
    }

    let prompt = build_commit_prompt(language.trim(), diff);
    debug!("Commit prompt length: {} chars", prompt.len());

    for model in models {
        let model: &str = model.as_ref();
        match backend.attempt(model, &prompt).await {
            ModelOutcome::Text(text) => {
                debug!("Model {} produced {} chars", model, text.len());
                return Ok(GeneratedMessage {
                    text,
                    model: Some(model.to_string()),
                });
            }
            ModelOutcome::Skip(e) => warn!("Model {} failed: {}. Trying next model.", model, e),
            ModelOutcome::Halt(e) => {
                warn!("Model {} failed: {}. Not trying further models.", model, e);
                break;
            }
        }
    }

    Ok(GeneratedMessage::fallback())
}
