//! Core data types shared across the negotiator API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-supplied key correlating requests into one dialogue.
pub type ConversationId = String;

/// Free-form influencer profile, in the caller's key order.
pub type InfluencerProfile = serde_json::Map<String, serde_json::Value>;

/// Speaker role for a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Caller-authored turn (including the synthesized initial prompt).
    User,
    /// Model-generated turn.
    Model,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One message in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Snapshot of a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationRecord {
    /// Ordered turns, oldest first.
    pub history: Vec<Turn>,
    /// Last time the conversation was created or appended to.
    pub last_activity: DateTime<Utc>,
}

/// Result of a single-turn negotiation: an email split into parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pitch {
    pub subject: String,
    pub body: String,
    /// Full prompt sent to the model, when prompt echo is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_prompt: Option<String>,
}

/// Result of one multi-turn negotiation exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReply {
    pub response: String,
    pub conversation_id: ConversationId,
}

/// Liveness summary reported by the health probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub model: String,
    pub active_conversations: usize,
}

#[cfg(test)]
mod tests {
    use super::{ConversationReply, Pitch, Role, Turn};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn role_parses_and_formats() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("model".parse::<Role>(), Ok(Role::Model));
        assert!("assistant".parse::<Role>().is_err());
        assert_eq!(Role::Model.to_string(), "model");
    }

    #[test]
    fn turn_serializes_lowercase_role() {
        let value = serde_json::to_value(Turn::model("hi")).expect("serialize");
        assert_eq!(value, json!({ "role": "model", "content": "hi" }));
    }

    #[test]
    fn pitch_omits_prompt_unless_present() {
        let pitch = Pitch {
            subject: "s".to_string(),
            body: "b".to_string(),
            full_prompt: None,
        };
        assert_eq!(
            serde_json::to_value(&pitch).expect("serialize"),
            json!({ "subject": "s", "body": "b" })
        );

        let pitch = Pitch {
            full_prompt: Some("p".to_string()),
            ..pitch
        };
        assert_eq!(
            serde_json::to_value(&pitch).expect("serialize"),
            json!({ "subject": "s", "body": "b", "fullPrompt": "p" })
        );
    }

    #[test]
    fn conversation_reply_uses_camel_case() {
        let reply = ConversationReply {
            response: "ok".to_string(),
            conversation_id: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&reply).expect("serialize"),
            json!({ "response": "ok", "conversationId": "abc" })
        );
    }
}
