//! Persistence contracts consumed by the authentication core
//!
//! The service only sees the two traits below. Concrete stores are picked in
//! `main` and injected through `AppState`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lnd_shared::{Role, User};
use thiserror::Error;
use uuid::Uuid;

pub mod blacklist;
pub mod memory;
pub mod user;

pub use blacklist::{spawn_purge_task, PgTokenBlacklist, RedisTokenBlacklist};
pub use memory::{InMemoryBlacklist, InMemoryUserStore};
pub use user::PgUserRepository;

/// Store failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique key (the user email) already exists
    #[error("duplicate key")]
    DuplicateKey,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            StoreError::DuplicateKey
        } else {
            StoreError::Backend(err.into())
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// User records keyed by email
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Fails with `StoreError::DuplicateKey` when the email is taken
    async fn insert(&self, user: NewUser) -> Result<Uuid, StoreError>;

    async fn ping(&self) -> anyhow::Result<()>;
}

/// Revoked session tokens
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// True when an entry exists, whether or not its expiry has passed
    async fn exists(&self, token: &str) -> anyhow::Result<bool>;

    /// Idempotent: revoking an already revoked token is not an error
    async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()>;

    /// Drop entries whose expiry has passed, returning how many went
    async fn purge_expired(&self) -> anyhow::Result<u64>;

    async fn ping(&self) -> anyhow::Result<()>;
}
