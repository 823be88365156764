//! Raw-statement chat resource.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::chat::{Chat, ChatFilter, ChatPatch, CreateChat};
use parley_types::error::StorageError;
use sqlx::Row;
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Raw-statement implementation of the chat resource.
pub struct RawChatResource {
    pool: DatabasePool,
}

impl RawChatResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ChatRow {
    id: String,
    name: String,
    owner_id: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, StorageError> {
        Ok(Chat {
            id: parse_uuid(&self.id, "chat id")?,
            name: self.name,
            owner_id: parse_uuid(&self.owner_id, "owner_id")?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn row_to_chat(row: &sqlx::sqlite::SqliteRow) -> Result<Chat, StorageError> {
    ChatRow::from_row(row)
        .map_err(map_sqlx_err)?
        .into_chat()
}

impl Resource for RawChatResource {
    type Entity = Chat;
    type Create = CreateChat;
    type Filter = ChatFilter;
    type Patch = ChatPatch;

    async fn create(&self, input: CreateChat) -> Result<Chat, StorageError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO chats (id, name, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(input.owner_id.to_string())
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Chat {
            id,
            name: input.name,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Chat>, StorageError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_chat).transpose()
    }

    async fn find(&self, filter: &ChatFilter) -> Result<Option<Chat>, StorageError> {
        // Fixed field order: id, owner_id.
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(owner_id) = filter.owner_id {
            conditions.push("owner_id = ?");
            values.push(owner_id.to_string());
        }

        if conditions.is_empty() {
            return Ok(None);
        }

        let sql = format!("SELECT * FROM chats WHERE {} LIMIT 1", conditions.join(" AND "));
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let row = query
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_chat).transpose()
    }

    async fn find_all(&self, filter: &ChatFilter) -> Result<Vec<Chat>, StorageError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(owner_id) = filter.owner_id {
            conditions.push("owner_id = ?");
            values.push(owner_id.to_string());
        }

        let sql = if conditions.is_empty() {
            "SELECT * FROM chats".to_string()
        } else {
            format!("SELECT * FROM chats WHERE {}", conditions.join(" AND "))
        };

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.iter().map(row_to_chat).collect()
    }

    async fn update(&self, id: &Uuid, patch: &ChatPatch) -> Result<Option<Chat>, StorageError> {
        let mut updates: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(name) = &patch.name {
            updates.push("name = ?");
            values.push(name.clone());
        }

        if updates.is_empty() {
            return self.get(id).await;
        }

        updates.push("updated_at = ?");
        values.push(format_datetime(&Utc::now()));
        values.push(id.to_string());

        let sql = format!("UPDATE chats SET {} WHERE id = ?", updates.join(", "));
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

    async fn delete(&self, id: &Uuid) -> Result<Option<Chat>, StorageError> {
        let Some(chat) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        Ok(Some(chat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::raw::user::RawUserResource;
    use crate::sqlite::testutil::test_pool;
    use parley_types::user::CreateUser;

    async fn make_owner(pool: &DatabasePool, email: &str) -> Uuid {
        let users = RawUserResource::new(pool.clone());
        users
            .create(CreateUser {
                name: "Owner".to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool.clone());
        let owner = make_owner(&pool, "owner@example.com").await;

        let created = repo
            .create(CreateChat {
                name: "ideas".to_string(),
                owner_id: owner,
            })
            .await
            .unwrap();

        let found = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.owner_id, owner);
    }

    #[tokio::test]
    async fn test_create_requires_existing_owner() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool);

        let err = repo
            .create(CreateChat {
                name: "orphan".to_string(),
                owner_id: Uuid::now_v7(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_find_scopes_to_owner() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool.clone());
        let ada = make_owner(&pool, "ada@example.com").await;
        let grace = make_owner(&pool, "grace@example.com").await;

        let chat = repo
            .create(CreateChat {
                name: "mine".to_string(),
                owner_id: ada,
            })
            .await
            .unwrap();

        let hit = repo
            .find(&ChatFilter {
                id: Some(chat.id),
                owner_id: Some(ada),
            })
            .await
            .unwrap();
        assert!(hit.is_some());

        let miss = repo
            .find(&ChatFilter {
                id: Some(chat.id),
                owner_id: Some(grace),
            })
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_find_all_by_owner_and_unfiltered() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool.clone());
        let ada = make_owner(&pool, "ada@example.com").await;
        let grace = make_owner(&pool, "grace@example.com").await;

        for name in ["a", "b"] {
            repo.create(CreateChat {
                name: name.to_string(),
                owner_id: ada,
            })
            .await
            .unwrap();
        }
        repo.create(CreateChat {
            name: "c".to_string(),
            owner_id: grace,
        })
        .await
        .unwrap();

        let adas = repo
            .find_all(&ChatFilter {
                owner_id: Some(ada),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(adas.len(), 2);

        let all = repo.find_all(&ChatFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        assert!(repo.find(&ChatFilter::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rename_and_noop_update() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool.clone());
        let owner = make_owner(&pool, "owner@example.com").await;

        let chat = repo
            .create(CreateChat {
                name: "draft".to_string(),
                owner_id: owner,
            })
            .await
            .unwrap();

        let renamed = repo
            .update(
                &chat.id,
                &ChatPatch {
                    name: Some("final".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "final");

        let same = repo
            .update(&chat.id, &ChatPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same, renamed);
        assert_eq!(same.updated_at, renamed.updated_at);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_messages() {
        let pool = test_pool().await;
        let repo = RawChatResource::new(pool.clone());
        let owner = make_owner(&pool, "owner@example.com").await;

        let chat = repo
            .create(CreateChat {
                name: "doomed".to_string(),
                owner_id: owner,
            })
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO messages (id, chat_id, type, message, created_at, updated_at) VALUES (?, ?, 'user', 'hi', ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(chat.id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();

        let deleted = repo.delete(&chat.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, chat.id);

        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat.id.to_string())
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(remaining.0, 0);
    }
}
