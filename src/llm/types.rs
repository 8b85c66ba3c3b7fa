//! Gateway trait and the per-call-site generation parameters.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::LlmError;

/// Generation parameters for one model call. Call sites use fixed presets;
/// nothing is tuned at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl GenerationParams {
    /// Preset for the full triage judgment.
    pub const TRIAGE: Self = Self {
        temperature: 0.3,
        max_output_tokens: 400,
        top_p: 0.8,
        top_k: 40,
    };

    /// Preset for facility classification and recommendation replies.
    pub const CLASSIFY: Self = Self {
        temperature: 0.3,
        max_output_tokens: 500,
        top_p: 0.8,
        top_k: 40,
    };

    /// Tiny preset for the connectivity probe.
    pub const PROBE: Self = Self {
        temperature: 0.3,
        max_output_tokens: 10,
        top_p: 0.8,
        top_k: 40,
    };
}

/// One blocking round trip to a generative text model.
///
/// Implementations return the first candidate's text, which is not trusted
/// to be well-formed JSON; tolerant decoding happens downstream.
pub trait TextGenerate {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError>;
}

/// Mock gateway for tests: canned response (or canned failure) plus a call
/// counter so tests can assert how many round trips were attempted.
pub struct MockTextClient {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Respond(String),
    FailUpstream,
    Unconfigured,
}

impl MockTextClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: MockOutcome::Respond(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as a 503 from the endpoint.
    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::FailUpstream,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with a missing-credential error.
    pub fn unconfigured() -> Self {
        Self {
            outcome: MockOutcome::Unconfigured,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerate for MockTextClient {
    fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::FailUpstream => Err(LlmError::Upstream {
                status: 503,
                body: "mock failure".to_string(),
            }),
            MockOutcome::Unconfigured => Err(LlmError::MissingApiKey),
        }
    }
}
