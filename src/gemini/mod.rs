//! Gemini text-generation API.

pub mod client;
pub mod response;

pub use client::{API_KEY_HEADER, GeminiClient, ModelBackend, ModelOutcome, classify_failure};
pub use response::{GenerateRequest, GenerateResponse};
