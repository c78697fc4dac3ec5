//! autocommit - A CLI tool that writes commit messages for pending changes.
//!
//! # Overview
//!
//! autocommit collects the working tree's pending changes with the `git`
//! client, asks a Gemini model for a detailed commit message (falling back
//! through an ordered list of models), and commits the changes once the
//! operator accepts the message.

pub mod commit;
pub mod config;
pub mod confirm;
pub mod error;
pub mod gemini;
pub mod git;
pub mod pipeline;

// Re-export commonly used types
pub use commit::{FALLBACK_MESSAGE, GeneratedMessage};
pub use config::Config;
pub use confirm::{AssumeYes, Confirmer, TerminalConfirmer};
pub use error::{AutocommitError, ConfigError, GenerateError, GitError, PromptError};
pub use gemini::{GeminiClient, ModelBackend, ModelOutcome};
pub use git::{GitCli, Vcs};
pub use pipeline::{AbortReason, Outcome, Pipeline, RunOptions, RunState};
