//! User entity and its creation/filter/patch shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as stored by the backend.
///
/// The password is kept on the stored record because the backends round-trip
/// it; API callers receive [`ApiUser`], which omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-insert shape for a user. The id and timestamps are assigned by the
/// storage layer at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Conjunctive partial filter over users. All supplied, non-empty fields
/// must match.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<Uuid>,
    pub email: Option<String>,
}

impl UserFilter {
    /// The email term, if supplied and non-empty. Empty strings are not
    /// usable filter values.
    pub fn usable_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// True when the filter has zero usable fields.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.usable_email().is_none()
    }
}

/// Partial update for a user. Only present fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Caller-facing view of a user with the credential secret stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ApiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        User {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_api_user_strips_password() {
        let user = make_user();
        let api: ApiUser = user.clone().into();
        let json = serde_json::to_string(&api).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = make_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
