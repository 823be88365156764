//! Mapped chat resource.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::chat::{Chat, ChatFilter, ChatPatch, CreateChat};
use parley_types::error::StorageError;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Mapped implementation of the chat resource.
pub struct MappedChatResource {
    pool: DatabasePool,
}

impl MappedChatResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// SELECT with the filter's fields ANDed in fixed order (id, owner_id).
    fn select(filter: &ChatFilter) -> QueryBuilder<'static, Sqlite> {
        let mut qb: QueryBuilder<'static, Sqlite> = QueryBuilder::new("SELECT * FROM chats");
        let mut sep = " WHERE ";

        if let Some(id) = filter.id {
            qb.push(sep).push("id = ").push_bind(id.to_string());
            sep = " AND ";
        }
        if let Some(owner_id) = filter.owner_id {
            qb.push(sep)
                .push("owner_id = ")
                .push_bind(owner_id.to_string());
        }

        qb
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: String,
    name: String,
    owner_id: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
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

impl Resource for MappedChatResource {
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
        let row = sqlx::query_as::<_, ChatRow>("SELECT * FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(ChatRow::into_chat).transpose()
    }

    async fn find(&self, filter: &ChatFilter) -> Result<Option<Chat>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut qb = Self::select(filter);
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<ChatRow>()
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(ChatRow::into_chat).transpose()
    }

    async fn find_all(&self, filter: &ChatFilter) -> Result<Vec<Chat>, StorageError> {
        let mut qb = Self::select(filter);

        let rows = qb
            .build_query_as::<ChatRow>()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.into_iter().map(ChatRow::into_chat).collect()
    }

    async fn update(&self, id: &Uuid, patch: &ChatPatch) -> Result<Option<Chat>, StorageError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE chats SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(name) = &patch.name {
                fields.push("name = ").push_bind_unseparated(name.clone());
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
