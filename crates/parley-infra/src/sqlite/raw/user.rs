//! Raw-statement user resource.

use chrono::Utc;
use parley_core::resource::Resource;
use parley_types::error::StorageError;
use parley_types::user::{CreateUser, User, UserFilter, UserPatch};
use sqlx::Row;
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::{format_datetime, map_sqlx_err, parse_datetime, parse_uuid};

/// Raw-statement implementation of the user resource.
pub struct RawUserResource {
    pool: DatabasePool,
}

impl RawUserResource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type mapping snake-case columns to the domain entity.
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

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

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    UserRow::from_row(row)
        .map_err(map_sqlx_err)?
        .into_user()
}

impl Resource for RawUserResource {
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
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find(&self, filter: &UserFilter) -> Result<Option<User>, StorageError> {
        // Fixed field order: id, email.
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(email) = filter.usable_email() {
            conditions.push("email = ?");
            values.push(email.to_string());
        }

        if conditions.is_empty() {
            return Ok(None);
        }

        let sql = format!("SELECT * FROM users WHERE {} LIMIT 1", conditions.join(" AND "));
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let row = query
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StorageError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("id = ?");
            values.push(id.to_string());
        }
        if let Some(email) = filter.usable_email() {
            conditions.push("email = ?");
            values.push(email.to_string());
        }

        let sql = if conditions.is_empty() {
            "SELECT * FROM users".to_string()
        } else {
            format!("SELECT * FROM users WHERE {}", conditions.join(" AND "))
        };

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.iter().map(row_to_user).collect()
    }

    async fn update(&self, id: &Uuid, patch: &UserPatch) -> Result<Option<User>, StorageError> {
        // Fixed field order: name, email, password.
        let mut updates: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(name) = &patch.name {
            updates.push("name = ?");
            values.push(name.clone());
        }
        if let Some(email) = &patch.email {
            updates.push("email = ?");
            values.push(email.clone());
        }
        if let Some(password) = &patch.password {
            updates.push("password = ?");
            values.push(password.clone());
        }

        // Empty patch: no write, still re-fetch and return current state.
        if updates.is_empty() {
            return self.get(id).await;
        }

        updates.push("updated_at = ?");
        values.push(format_datetime(&Utc::now()));
        values.push(id.to_string());

        let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));
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
