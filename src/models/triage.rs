use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use super::place::Place;

/// Caller-supplied coordinates, echoed into the triage prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// One triage request from the routing layer.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageRequest {
    pub symptoms: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl TriageRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            location: None,
            history: Vec::new(),
        }
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(Location { lat, lng });
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }
}

/// Urgency level of a triage judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Alto,
    Medio,
    Bajo,
}

impl Urgency {
    /// Parse the model's `ALTO|MEDIO|BAJO` token, tolerating case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alto" => Some(Self::Alto),
            "medio" => Some(Self::Medio),
            "bajo" => Some(Self::Bajo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alto => "alto",
            Self::Medio => "medio",
            Self::Bajo => "bajo",
        }
    }
}

/// Client-side action requested instead of a clinical answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientAction {
    #[serde(rename = "mostrar_farmacias")]
    ShowPharmacies,
}

impl ClientAction {
    /// Parse the action token from the model. Unknown tokens are dropped.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "mostrar_farmacias" => Some(Self::ShowPharmacies),
            _ => None,
        }
    }
}

/// What the service hands back to the routing layer for one symptom message.
///
/// `urgency` is unset only for the action-only and gibberish response modes;
/// every path through the model defaults it to medium otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Ordered HTML fragments, already joined for display.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    pub recommendations: Vec<String>,
    pub specialties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ClientAction>,
}

/// Ranked open facilities plus the advisory message shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommended: Vec<Place>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_parses_model_tokens() {
        assert_eq!(Urgency::parse("ALTO"), Some(Urgency::Alto));
        assert_eq!(Urgency::parse(" medio "), Some(Urgency::Medio));
        assert_eq!(Urgency::parse("Bajo"), Some(Urgency::Bajo));
        assert_eq!(Urgency::parse("critical"), None);
    }

    #[test]
    fn urgency_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Urgency::Alto).unwrap(), "\"alto\"");
    }

    #[test]
    fn action_parses_pharmacy_token_only() {
        assert_eq!(
            ClientAction::parse("mostrar_farmacias"),
            Some(ClientAction::ShowPharmacies)
        );
        assert_eq!(ClientAction::parse("mostrar_hospitales"), None);
    }

    #[test]
    fn request_builder_fills_optionals() {
        let request = TriageRequest::new("fiebre alta")
            .with_location(-34.6, -58.4)
            .with_history(vec![ChatMessage::user("hola")]);
        assert_eq!(request.location.unwrap().lat, -34.6);
        assert_eq!(request.history.len(), 1);
    }
}
