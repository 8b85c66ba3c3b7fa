//! AI-orchestration core of the Xana virtual medical assistant.
//!
//! The crate classifies free-text symptom descriptions, builds Gemini
//! prompts, tolerantly recovers structured judgments from unreliable model
//! output, and filters/ranks nearby medical facilities. HTTP routing,
//! sessions and persistence live in the consuming server; this crate holds
//! no state beyond its read-once configuration.

pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod service;

pub use pipeline::TriageError;
pub use service::TriageService;
