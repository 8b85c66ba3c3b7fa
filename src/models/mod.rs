pub mod message;
pub mod place;
pub mod triage;

pub use message::{ChatMessage, MessageRole};
pub use place::{OpeningHours, Place};
pub use triage::{
    ClientAction, Location, RecommendationResult, TriageRequest, TriageResult, Urgency,
};
