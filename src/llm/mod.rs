//! Gateway to the generative model endpoint.
//!
//! One blocking round trip per call, bounded timeout, no retry or backoff:
//! a failed call surfaces immediately and the caller decides what to do.

pub mod gemini;
pub mod types;

use thiserror::Error;

pub use gemini::GeminiClient;
pub use types::{GenerationParams, MockTextClient, TextGenerate};

/// Errors from the model gateway.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("no Gemini API key configured")]
    MissingApiKey,

    #[error("Gemini API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("response parsing error: {0}")]
    ResponseParsing(String),
}
