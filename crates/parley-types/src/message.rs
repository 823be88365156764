//! Message entity, role tag, and creation/filter/patch shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role tag of a message within a chat.
///
/// Maps to the `type` column in the messages table. Closed set: messages are
/// either written by the user or generated by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a chat. Many messages per chat, ordered by
/// `created_at` ascending -- this ordering forms the conversation context
/// sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-insert shape for a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessage {
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

/// Conjunctive partial filter over messages.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
}

impl MessageFilter {
    /// True when the filter has zero usable fields.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.chat_id.is_none()
    }
}

/// Partial update for a message.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub role: Option<MessageRole>,
    pub content: Option<String>,
}

impl MessagePatch {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.content.is_none()
    }
}
