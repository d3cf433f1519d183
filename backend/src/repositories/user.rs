//! Postgres-backed credential store

use super::{CredentialStore, NewUser, StoreError};
use crate::db;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lnd_shared::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Row as stored in `users`
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>().map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
        })
    }
}

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn ping(&self) -> Result<()> {
        db::health_check(&self.pool).await
    }
}
