//! The triage pipelines: input classification, prompt construction, tolerant
//! response decoding, result formatting, and the facility filter/ranking
//! stages.

pub mod classify;
pub mod extract;
pub mod filter;
pub mod format;
pub mod prompt;
pub mod recommend;

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced to the routing layer.
///
/// Parse/format trouble never appears here: extraction failures are absorbed
/// locally with typed defaults (see [`extract`]). Configuration and upstream
/// problems are not recoverable and do propagate.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("no Gemini API key configured")]
    MissingApiKey,

    #[error("Gemini API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("response parsing error: {0}")]
    ResponseParsing(String),
}

impl From<LlmError> for TriageError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => Self::MissingApiKey,
            LlmError::Upstream { status, body } => Self::Upstream { status, body },
            LlmError::Http(msg) => Self::Http(msg),
            LlmError::ResponseParsing(msg) => Self::ResponseParsing(msg),
        }
    }
}
