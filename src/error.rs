//! Error types for autocommit modules using thiserror.

use thiserror::Error;

use crate::config::{ENV_EXAMPLE_HINT, LANGUAGE_VAR};

/// Errors from configuration loading.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "The following environment variables are not set:\n{}\n\n{}",
        format_missing(.0),
        ENV_EXAMPLE_HINT
    )]
    Missing(Vec<&'static str>),

    #[error("Target language must not be blank. Set {} or pass --lang.", LANGUAGE_VAR)]
    BlankLanguage,
}

fn format_missing(names: &[&'static str]) -> String {
    names
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors from git subprocess invocations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found in PATH. Install git and try again.")]
    NotInstalled,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} exited with code {code}: {stderr}")]
    NonZeroExit {
        operation: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to list working tree entries: {0}")]
    ListEntries(String),
}

/// Errors from a single model attempt against the Gemini API.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("model unavailable (HTTP {status})")]
    Unavailable { status: u16 },

    #[error("quota exhausted (HTTP 429)")]
    QuotaExhausted,

    #[error("unexpected HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("response contained no text")]
    EmptyResponse,
}

/// Errors from interactive confirmation prompts.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Failed to read answer: {0}")]
    Io(String),
}

/// Errors that end a run early.
#[derive(Error, Debug)]
pub enum AutocommitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Failed to initialize repository: {0}")]
    InitFailed(#[source] GitError),

    #[error("Failed to collect changes: {0}")]
    ChangesFailed(#[source] GitError),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] GitError),
}
