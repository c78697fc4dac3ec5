//! Yes/no confirmation prompts.

use std::io;

use dialoguer::Input;

use crate::error::PromptError;

/// Answers accepted as "yes" (compared trimmed and lowercased).
pub const AFFIRMATIVE_TOKENS: &[&str] = &["s", "sim", "y", "yes"];

/// Whether an operator answer counts as "yes".
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&answer.as_str())
}

/// Source of yes/no answers for the pipeline.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmer {
    fn confirm(&self, question: &str) -> Result<bool, PromptError>;
}

/// Asks on the terminal through dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        let answer: String = Input::new()
            .with_prompt(format!("{question} (s/n)"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(err) if err.kind() == io::ErrorKind::Interrupted => {
                    PromptError::Cancelled
                }
                other => PromptError::Io(other.to_string()),
            })?;
        Ok(is_affirmative(&answer))
    }
}

/// Answers every question with "yes" (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        println!("{question} (s/n): s");
        Ok(true)
    }
}
