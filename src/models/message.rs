use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Label used when the transcript is serialized into a prompt.
    pub fn speaker_label(&self) -> &'static str {
        match self {
            Self::User => "Usuario",
            Self::Assistant => "Asistente",
        }
    }
}

/// One turn of the triage conversation, replayed verbatim into prompts in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_deserializes_from_lowercase() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role": "user", "content": "me duele la cabeza"}"#).unwrap();
        assert_eq!(msg.role, MessageRole::User);
    }

    #[test]
    fn speaker_labels_are_spanish() {
        assert_eq!(MessageRole::User.speaker_label(), "Usuario");
        assert_eq!(MessageRole::Assistant.speaker_label(), "Asistente");
    }
}
