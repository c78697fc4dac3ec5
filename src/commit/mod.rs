//! AI-generated commit messages and the final commit.

pub mod executor;
pub mod message;
pub mod prompt;

pub use executor::stage_and_commit;
pub use message::{
    DEFAULT_MODELS, FALLBACK_MESSAGE, GeneratedMessage, generate_commit_message,
};
pub use prompt::build_commit_prompt;
