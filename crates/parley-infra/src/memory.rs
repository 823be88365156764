//! In-memory resource implementations.
//!
//! Each resource keeps its rows in a [`DashMap`] keyed by id. Filters are
//! linear scans with the same conjunctive semantics as the SQLite backends;
//! message `find_all` sorts by creation time. DashMap's per-entry locking
//! guards every read-modify-write (`update` mutates under the entry lock),
//! so concurrent callers cannot lose updates. Nothing survives a restart.

use chrono::Utc;
use dashmap::DashMap;
use parley_core::resource::Resource;
use parley_types::chat::{Chat, ChatFilter, ChatPatch, CreateChat};
use parley_types::error::StorageError;
use parley_types::message::{CreateMessage, Message, MessageFilter, MessagePatch};
use parley_types::user::{CreateUser, User, UserFilter, UserPatch};
use uuid::Uuid;

/// In-memory implementation of the user resource.
#[derive(Default)]
pub struct MemoryUserResource {
    rows: DashMap<Uuid, User>,
}

impl MemoryUserResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_user(user: &User, filter: &UserFilter) -> bool {
    filter.id.is_none_or(|id| user.id == id)
        && filter
            .usable_email()
            .is_none_or(|email| user.email == email)
}

impl Resource for MemoryUserResource {
    type Entity = User;
    type Create = CreateUser;
    type Filter = UserFilter;
    type Patch = UserPatch;

    async fn create(&self, input: CreateUser) -> Result<User, StorageError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            password: input.password,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn find(&self, filter: &UserFilter) -> Result<Option<User>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }
        Ok(self
            .rows
            .iter()
            .find(|r| matches_user(r.value(), filter))
            .map(|r| r.clone()))
    }

    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StorageError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| matches_user(r.value(), filter))
            .map(|r| r.clone())
            .collect())
    }

    async fn update(&self, id: &Uuid, patch: &UserPatch) -> Result<Option<User>, StorageError> {
        let Some(mut entry) = self.rows.get_mut(id) else {
            return Ok(None);
        };
        if !patch.is_empty() {
            let user = entry.value_mut();
            if let Some(name) = &patch.name {
                user.name = name.clone();
            }
            if let Some(email) = &patch.email {
                user.email = email.clone();
            }
            if let Some(password) = &patch.password {
                user.password = password.clone();
            }
            user.updated_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.rows.remove(id).map(|(_, user)| user))
    }
}

/// In-memory implementation of the chat resource.
#[derive(Default)]
pub struct MemoryChatResource {
    rows: DashMap<Uuid, Chat>,
}

impl MemoryChatResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_chat(chat: &Chat, filter: &ChatFilter) -> bool {
    filter.id.is_none_or(|id| chat.id == id)
        && filter.owner_id.is_none_or(|owner| chat.owner_id == owner)
}

impl Resource for MemoryChatResource {
    type Entity = Chat;
    type Create = CreateChat;
    type Filter = ChatFilter;
    type Patch = ChatPatch;

    async fn create(&self, input: CreateChat) -> Result<Chat, StorageError> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::now_v7(),
            name: input.name,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Chat>, StorageError> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn find(&self, filter: &ChatFilter) -> Result<Option<Chat>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }
        Ok(self
            .rows
            .iter()
            .find(|r| matches_chat(r.value(), filter))
            .map(|r| r.clone()))
    }

    async fn find_all(&self, filter: &ChatFilter) -> Result<Vec<Chat>, StorageError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| matches_chat(r.value(), filter))
            .map(|r| r.clone())
            .collect())
    }

    async fn update(&self, id: &Uuid, patch: &ChatPatch) -> Result<Option<Chat>, StorageError> {
        let Some(mut entry) = self.rows.get_mut(id) else {
            return Ok(None);
        };
        if !patch.is_empty() {
            let chat = entry.value_mut();
            if let Some(name) = &patch.name {
                chat.name = name.clone();
            }
            chat.updated_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<Chat>, StorageError> {
        Ok(self.rows.remove(id).map(|(_, chat)| chat))
    }
}

/// In-memory implementation of the message resource.
#[derive(Default)]
pub struct MemoryMessageResource {
    rows: DashMap<Uuid, Message>,
}

impl MemoryMessageResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_message(message: &Message, filter: &MessageFilter) -> bool {
    filter.id.is_none_or(|id| message.id == id)
        && filter.chat_id.is_none_or(|chat| message.chat_id == chat)
}

impl Resource for MemoryMessageResource {
    type Entity = Message;
    type Create = CreateMessage;
    type Filter = MessageFilter;
    type Patch = MessagePatch;

    async fn create(&self, input: CreateMessage) -> Result<Message, StorageError> {
        let now = Utc::now();
        let message = Message {
            id: Uuid::now_v7(),
            chat_id: input.chat_id,
            role: input.role,
            content: input.content,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Message>, StorageError> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn find(&self, filter: &MessageFilter) -> Result<Option<Message>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }
        Ok(self
            .rows
            .iter()
            .find(|r| matches_message(r.value(), filter))
            .map(|r| r.clone()))
    }

    async fn find_all(&self, filter: &MessageFilter) -> Result<Vec<Message>, StorageError> {
        let mut out: Vec<Message> = self
            .rows
            .iter()
            .filter(|r| matches_message(r.value(), filter))
            .map(|r| r.clone())
            .collect();
        // Creation-time order; ids are v7 so they break timestamp ties in
        // allocation order.
        out.sort_by_key(|m| (m.created_at, m.id));
        Ok(out)
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StorageError> {
        let Some(mut entry) = self.rows.get_mut(id) else {
            return Ok(None);
        };
        if !patch.is_empty() {
            let message = entry.value_mut();
            if let Some(role) = patch.role {
                message.role = role;
            }
            if let Some(content) = &patch.content {
                message.content = content.clone();
            }
            message.updated_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<Message>, StorageError> {
        Ok(self.rows.remove(id).map(|(_, message)| message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::message::MessageRole;
    use std::sync::Arc;

    fn make_user_input(email: &str) -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = MemoryUserResource::new();
        let before = Utc::now();
        let created = repo.create(make_user_input("ada@example.com")).await.unwrap();
        let found = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(found.created_at >= before && found.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_find_conjunctive_and_zero_field() {
        let repo = MemoryUserResource::new();
        let ada = repo.create(make_user_input("ada@example.com")).await.unwrap();
        repo.create(make_user_input("grace@example.com")).await.unwrap();

        let miss = repo
            .find(&UserFilter {
                id: Some(ada.id),
                email: Some("grace@example.com".to_string()),
            })
            .await
            .unwrap();
        assert!(miss.is_none());

        // Empty string is not usable; zero usable fields.
        let empty = UserFilter {
            id: None,
            email: Some(String::new()),
        };
        assert!(repo.find(&empty).await.unwrap().is_none());
        assert_eq!(repo.find_all(&empty).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let repo = MemoryUserResource::new();
        let user = repo.create(make_user_input("ada@example.com")).await.unwrap();

        let same = repo
            .update(&user.id, &UserPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same, user);
        assert_eq!(same.updated_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_delete_returns_prior_then_absent() {
        let repo = MemoryUserResource::new();
        let user = repo.create(make_user_input("ada@example.com")).await.unwrap();

        assert_eq!(repo.delete(&user.id).await.unwrap().unwrap(), user);
        assert!(repo.get(&user.id).await.unwrap().is_none());
        assert!(repo.delete(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_messages_ordered_under_concurrent_writers() {
        let repo = Arc::new(MemoryMessageResource::new());
        let chat_id = Uuid::now_v7();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(CreateMessage {
                    chat_id,
                    role: MessageRole::User,
                    content: format!("msg-{i}"),
                })
                .await
                .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = repo
            .find_all(&MessageFilter {
                chat_id: Some(chat_id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(history.len(), 16);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_find_all_scoped_to_chat() {
        let repo = MemoryMessageResource::new();
        let chat_a = Uuid::now_v7();
        let chat_b = Uuid::now_v7();

        for chat_id in [chat_a, chat_a, chat_b] {
            repo.create(CreateMessage {
                chat_id,
                role: MessageRole::User,
                content: "x".to_string(),
            })
            .await
            .unwrap();
        }

        let scoped = repo
            .find_all(&MessageFilter {
                chat_id: Some(chat_a),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(scoped.len(), 2);

        let all = repo.find_all(&MessageFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
