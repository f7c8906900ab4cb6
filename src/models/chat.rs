use chrono::Utc;
use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    MealPlan,
    Recipe,
    ShoppingList,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: JsonValue,
}

/// One chat bubble. `content` is plain text for user and error messages and
/// HTML for formatted assistant replies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
            metadata: None,
        }
    }

    pub fn assistant(content: String, kind: MessageKind, data: JsonValue) -> Self {
        Self {
            role: Role::Assistant,
            content,
            timestamp: Utc::now().timestamp(),
            metadata: Some(MessageMetadata { kind, data }),
        }
    }

    pub fn error(message: &str) -> Self {
        Self::assistant(
            message.to_string(),
            MessageKind::Error,
            JsonValue::String(message.to_string())
        )
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.metadata.as_ref().map(|m| m.kind)
    }

    pub fn is_error(&self) -> bool {
        self.kind() == Some(MessageKind::Error)
    }
}
