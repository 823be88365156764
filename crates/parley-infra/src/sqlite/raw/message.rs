//! Raw-statement message resource.
//!
//! Messages carry the column-name translation: domain `role` is stored in
//! the `type` column and domain `content` in the `message` column.
//! `find_all` always orders ascending by creation time -- this sequence is
//! the conversation context sent to the provider.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::error::StorageError;
use parley_types::message::{CreateMessage, Message, MessageFilter, MessagePatch, MessageRole};
use sqlx::Row;
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Raw-statement implementation of the message resource.
pub struct RawMessageResource {
    pool: DatabasePool,
}

impl RawMessageResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    created_at: String,
    updated_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("type")?,
            content: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_message(self) -> Result<Message, StorageError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(StorageError::Query)?;

        Ok(Message {
            id: parse_uuid(&self.id, "message id")?,
            chat_id: parse_uuid(&self.chat_id, "chat_id")?,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, StorageError> {
    MessageRow::from_row(row)
        .map_err(map_sqlx_err)?
        .into_message()
}

impl Resource for RawMessageResource {
    type Entity = Message;
    type Create = CreateMessage;
    type Filter = MessageFilter;
    type Patch = MessagePatch;

    async fn create(&self, input: CreateMessage) -> Result<Message, StorageError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO messages (id, chat_id, type, message, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(input.chat_id.to_string())
        .bind(input.role.to_string())
        .bind(&input.content)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Message {
            id,
            chat_id: input.chat_id,
            role: input.role,
            content: input.content,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Message>, StorageError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn find(&self, filter: &MessageFilter) -> Result<Option<Message>, StorageError> {
        // Fixed field order: id, chat_id.
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(chat_id) = filter.chat_id {
            conditions.push("chat_id = ?");
            values.push(chat_id.to_string());
        }

        if conditions.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT * FROM messages WHERE {} LIMIT 1",
            conditions.join(" AND ")
        );
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let row = query
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn find_all(&self, filter: &MessageFilter) -> Result<Vec<Message>, StorageError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(chat_id) = filter.chat_id {
            conditions.push("chat_id = ?");
            values.push(chat_id.to_string());
        }

        let sql = if conditions.is_empty() {
            "SELECT * FROM messages ORDER BY created_at ASC".to_string()
        } else {
            format!(
                "SELECT * FROM messages WHERE {} ORDER BY created_at ASC",
                conditions.join(" AND ")
            )
        };

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.iter().map(row_to_message).collect()
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StorageError> {
        // Fixed field order: message, type.
        let mut updates: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(content) = &patch.content {
            updates.push("message = ?");
            values.push(content.clone());
        }
        if let Some(role) = patch.role {
            updates.push("type = ?");
            values.push(role.to_string());
        }

        if updates.is_empty() {
            return self.get(id).await;
        }

        updates.push("updated_at = ?");
        values.push(format_datetime(&Utc::now()));
        values.push(id.to_string());

        let sql = format!("UPDATE messages SET {} WHERE id = ?", updates.join(", "));
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        query
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        self.get(id).await
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<Message>, StorageError> {
        let Some(message) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::raw::chat::RawChatResource;
    use crate::sqlite::raw::user::RawUserResource;
    use crate::sqlite::testutil::test_pool;
    use parley_types::chat::CreateChat;
    use parley_types::user::CreateUser;

    async fn make_chat(pool: &DatabasePool) -> Uuid {
        let owner = RawUserResource::new(pool.clone())
            .create(CreateUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap()
            .id;
        RawChatResource::new(pool.clone())
            .create(CreateChat {
                name: "chat".to_string(),
                owner_id: owner,
            })
            .await
            .unwrap()
            .id
    }

    fn user_message(chat_id: Uuid, content: &str) -> CreateMessage {
        CreateMessage {
            chat_id,
            role: MessageRole::User,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_maps_every_column() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let created = repo.create(user_message(chat_id, "hello")).await.unwrap();
        let found = repo.get(&created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.chat_id, chat_id);
        assert_eq!(found.role, MessageRole::User);
        assert_eq!(found.content, "hello");
    }

    #[tokio::test]
    async fn test_role_is_stored_in_type_column() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let created = repo
            .create(CreateMessage {
                chat_id,
                role: MessageRole::Assistant,
                content: "reply".to_string(),
            })
            .await
            .unwrap();

        let (tag, body): (String, String) =
            sqlx::query_as("SELECT type, message FROM messages WHERE id = ?")
                .bind(created.id.to_string())
                .fetch_one(&pool.reader)
                .await
                .unwrap();
        assert_eq!(tag, "assistant");
        assert_eq!(body, "reply");
    }

    #[tokio::test]
    async fn test_create_requires_existing_chat() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool);

        let err = repo
            .create(user_message(Uuid::now_v7(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_find_all_orders_by_creation_time() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        // Insert rows with explicit timestamps, out of chronological order.
        for (content, at) in [
            ("third", "2026-08-30T10:00:03+00:00"),
            ("first", "2026-08-30T10:00:01+00:00"),
            ("second", "2026-08-30T10:00:02+00:00"),
        ] {
            sqlx::query(
                "INSERT INTO messages (id, chat_id, type, message, created_at, updated_at) VALUES (?, ?, 'user', ?, ?, ?)",
            )
            .bind(Uuid::now_v7().to_string())
            .bind(chat_id.to_string())
            .bind(content)
            .bind(at)
            .bind(at)
            .execute(&pool.writer)
            .await
            .unwrap();
        }

        let history = repo
            .find_all(&MessageFilter {
                chat_id: Some(chat_id),
                ..Default::default()
            })
            .await
            .unwrap();

        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_zero_field_filter_semantics() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        repo.create(user_message(chat_id, "a")).await.unwrap();
        repo.create(user_message(chat_id, "b")).await.unwrap();

        assert!(repo.find(&MessageFilter::default()).await.unwrap().is_none());
        assert_eq!(repo.find_all(&MessageFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_noop_update() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let message = repo.create(user_message(chat_id, "typo")).await.unwrap();

        let fixed = repo
            .update(
                &message.id,
                &MessagePatch {
                    content: Some("fixed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fixed.content, "fixed");
        assert_eq!(fixed.role, MessageRole::User);

        let same = repo
            .update(&message.id, &MessagePatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same, fixed);
        assert_eq!(same.updated_at, fixed.updated_at);
    }

    #[tokio::test]
    async fn test_delete_returns_prior_then_absent() {
        let pool = test_pool().await;
        let repo = RawMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let message = repo.create(user_message(chat_id, "bye")).await.unwrap();

        let deleted = repo.delete(&message.id).await.unwrap().unwrap();
        assert_eq!(deleted, message);
        assert!(repo.get(&message.id).await.unwrap().is_none());
        assert!(repo.delete(&message.id).await.unwrap().is_none());
    }
}
