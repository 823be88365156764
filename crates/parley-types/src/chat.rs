//! Chat entity and its creation/filter/patch shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat owned by a single user. Many chats per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-insert shape for a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChat {
    pub name: String,
    pub owner_id: Uuid,
}

/// Conjunctive partial filter over chats.
#[derive(Debug, Clone, Default)]
pub struct ChatFilter {
    pub id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl ChatFilter {
    /// True when the filter has zero usable fields.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.owner_id.is_none()
    }
}

/// Partial update for a chat. The owner is immutable.
#[derive(Debug, Clone, Default)]
pub struct ChatPatch {
    pub name: Option<String>,
}

impl ChatPatch {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_serializes_camel_case() {
        let chat = Chat {
            id: Uuid::now_v7(),
            name: "project ideas".to_string(),
            owner_id: Uuid::now_v7(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&chat).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("owner_id").is_none());
    }
}
