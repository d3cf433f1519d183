//! In-process stores
//!
//! Used by the test suites and for running the router without Postgres.
//! They honour the same contracts as the database-backed stores.

use super::{CredentialStore, NewUser, StoreError, TokenBlacklist};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lnd_shared::User;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users keyed by email
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::DuplicateKey);
        }

        let id = Uuid::new_v4();
        users.insert(
            user.email.clone(),
            User {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Revoked tokens with their expiry
#[derive(Default)]
pub struct InMemoryBlacklist {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn expiry_of(&self, token: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(token).copied()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn exists(&self, token: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(token))
    }

    async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(token.to_string()).or_insert(expires_at);
        if expires_at > *entry {
            *entry = expires_at;
        }
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
