//! Session and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::{ChatMode, ModelType};
use crate::llm::{Role, Turn};

/// One recorded conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role,
            text: self.text.clone(),
        }
    }
}

/// A conversation: configuration plus its ordered message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub model_type: ModelType,
    pub mode: ChatMode,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A fresh session with a random v4 id and an empty log.
    pub fn new(model_type: ModelType, mode: ChatMode) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            model_type,
            mode,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Sessions expire a fixed time after creation.
pub(crate) fn is_expired(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    ttl: chrono::Duration,
) -> bool {
    now.signed_duration_since(created_at) >= ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty_with_uuid() {
        let record = SessionRecord::new(ModelType::Flash, ChatMode::Chat);
        assert!(record.messages.is_empty());
        assert!(uuid::Uuid::parse_str(&record.session_id).is_ok());
    }

    #[test]
    fn expiry_is_measured_from_creation() {
        let record = SessionRecord::new(ModelType::default(), ChatMode::default());
        let ttl = chrono::Duration::days(30);
        let created = record.created_at;
        assert!(!is_expired(created, created + chrono::Duration::days(29), ttl));
        assert!(is_expired(created, created + ttl, ttl));
    }

    #[test]
    fn message_json_shape() {
        let message = Message::new(Role::Model, "Hi there");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "model");
        assert_eq!(value["text"], "Hi there");
        assert!(value["timestamp"].is_string());
        assert_eq!(message.to_turn(), Turn::model("Hi there"));
    }
}
