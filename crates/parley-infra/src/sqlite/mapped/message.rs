//! Mapped message resource.
//!
//! The row struct carries the column-name translation (`type` -> role,
//! `message` -> content) via `#[sqlx(rename)]`; ordering by creation time
//! is appended to every `find_all`.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::error::StorageError;
use parley_types::message::{CreateMessage, Message, MessageFilter, MessagePatch, MessageRole};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Mapped implementation of the message resource.
pub struct MappedMessageResource {
    pool: DatabasePool,
}

impl MappedMessageResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// SELECT with the filter's fields ANDed in fixed order (id, chat_id).
    fn select(filter: &MessageFilter) -> QueryBuilder<'static, Sqlite> {
        let mut qb: QueryBuilder<'static, Sqlite> = QueryBuilder::new("SELECT * FROM messages");
        let mut sep = " WHERE ";

        if let Some(id) = filter.id {
            qb.push(sep).push("id = ").push_bind(id.to_string());
            sep = " AND ";
        }
        if let Some(chat_id) = filter.chat_id {
            qb.push(sep)
                .push("chat_id = ")
                .push_bind(chat_id.to_string());
        }

        qb
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    chat_id: String,
    #[sqlx(rename = "type")]
    role: String,
    #[sqlx(rename = "message")]
    content: String,
    created_at: String,
    updated_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, StorageError> {
        let role: MessageRole = self.role.parse().map_err(StorageError::Query)?;

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

impl Resource for MappedMessageResource {
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
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(MessageRow::into_message).transpose()
    }

    async fn find(&self, filter: &MessageFilter) -> Result<Option<Message>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut qb = Self::select(filter);
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<MessageRow>()
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(MessageRow::into_message).transpose()
    }

    async fn find_all(&self, filter: &MessageFilter) -> Result<Vec<Message>, StorageError> {
        let mut qb = Self::select(filter);
        qb.push(" ORDER BY created_at ASC");

        let rows = qb
            .build_query_as::<MessageRow>()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StorageError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE messages SET ");
        {
            // Fixed field order: message, type.
            let mut fields = qb.separated(", ");
            if let Some(content) = &patch.content {
                fields
                    .push("message = ")
                    .push_bind_unseparated(content.clone());
            }
            if let Some(role) = patch.role {
                fields.push("type = ").push_bind_unseparated(role.to_string());
            }
            fields
                .push("updated_at = ")
                .push_bind_unseparated(format_datetime(&Utc::now()));
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        qb.build()
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
    use crate::sqlite::mapped::chat::MappedChatResource;
    use crate::sqlite::mapped::user::MappedUserResource;
    use crate::sqlite::testutil::test_pool;
    use parley_types::chat::CreateChat;
    use parley_types::user::CreateUser;

    async fn make_chat(pool: &DatabasePool) -> Uuid {
        let owner = MappedUserResource::new(pool.clone())
            .create(CreateUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap()
            .id;
        MappedChatResource::new(pool.clone())
            .create(CreateChat {
                name: "chat".to_string(),
                owner_id: owner,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_renamed_columns_roundtrip() {
        let pool = test_pool().await;
        let repo = MappedMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let created = repo
            .create(CreateMessage {
                chat_id,
                role: MessageRole::Assistant,
                content: "reply".to_string(),
            })
            .await
            .unwrap();

        let found = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(found.role, MessageRole::Assistant);
        assert_eq!(found.content, "reply");
    }

    #[tokio::test]
    async fn test_find_all_orders_by_creation_time() {
        let pool = test_pool().await;
        let repo = MappedMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        for (content, at) in [
            ("second", "2026-08-30T10:00:02+00:00"),
            ("first", "2026-08-30T10:00:01+00:00"),
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
        assert_eq!(contents, ["first", "second"]);
    }

    #[tokio::test]
    async fn test_update_role_and_content() {
        let pool = test_pool().await;
        let repo = MappedMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let message = repo
            .create(CreateMessage {
                chat_id,
                role: MessageRole::User,
                content: "draft".to_string(),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &message.id,
                &MessagePatch {
                    role: Some(MessageRole::Assistant),
                    content: Some("edited".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, MessageRole::Assistant);
        assert_eq!(updated.content, "edited");

        let same = repo
            .update(&message.id, &MessagePatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same, updated);
    }

    #[tokio::test]
    async fn test_delete_then_absent() {
        let pool = test_pool().await;
        let repo = MappedMessageResource::new(pool.clone());
        let chat_id = make_chat(&pool).await;

        let message = repo
            .create(CreateMessage {
                chat_id,
                role: MessageRole::User,
                content: "bye".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(repo.delete(&message.id).await.unwrap().unwrap(), message);
        assert!(repo.get(&message.id).await.unwrap().is_none());
    }
}
