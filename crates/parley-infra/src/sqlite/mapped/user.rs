//! Mapped user resource.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::error::StorageError;
use parley_types::user::{CreateUser, User, UserFilter, UserPatch};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Mapped implementation of the user resource.
pub struct MappedUserResource {
    pool: DatabasePool,
}

impl MappedUserResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// SELECT with the filter's usable fields ANDed in fixed order
    /// (id, email). Returns the builder so callers append LIMIT.
    fn select(filter: &UserFilter) -> QueryBuilder<'static, Sqlite> {
        let mut qb: QueryBuilder<'static, Sqlite> = QueryBuilder::new("SELECT * FROM users");
        let mut sep = " WHERE ";

        if let Some(id) = filter.id {
            qb.push(sep).push("id = ").push_bind(id.to_string());
            sep = " AND ";
        }
        if let Some(email) = filter.usable_email() {
            qb.push(sep).push("email = ").push_bind(email.to_string());
        }

        qb
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, StorageError> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            name: self.name,
            email: self.email,
            password: self.password,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl Resource for MappedUserResource {
    type Entity = User;
    type Create = CreateUser;
    type Filter = UserFilter;
    type Patch = UserPatch;

    async fn create(&self, input: CreateUser) -> Result<User, StorageError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, name, email, password, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;

        Ok(User {
            id,
            name: input.name,
            email: input.email,
            password: input.password,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find(&self, filter: &UserFilter) -> Result<Option<User>, StorageError> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut qb = Self::select(filter);
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StorageError> {
        let mut qb = Self::select(filter);

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, id: &Uuid, patch: &UserPatch) -> Result<Option<User>, StorageError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        {
            // Fixed field order: name, email, password.
            let mut fields = qb.separated(", ");
            if let Some(name) = &patch.name {
                fields.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(email) = &patch.email {
                fields.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(password) = &patch.password {
                fields
                    .push("password = ")
                    .push_bind_unseparated(password.clone());
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

    async fn delete(&self, id: &Uuid) -> Result<Option<User>, StorageError> {
        let Some(user) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        Ok(Some(user))
    }
}
