//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Stores are built once in `main` and injected here; nothing opens a
//! connection lazily on first request.

use crate::auth::SessionTokenCodec;
use crate::config::AppConfig;
use crate::repositories::{CredentialStore, TokenBlacklist};
use crate::services::AuthService;
use std::sync::Arc;

/// Shared application state
///
/// All fields are `Arc`s, so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn CredentialStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    auth: AuthService,
}

impl AppState {
    /// Create the application state
    ///
    /// Derives the JWT keys from the configured secret, so call it once at
    /// startup.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn CredentialStore>,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> Self {
        let codec = SessionTokenCodec::new(&config.jwt.secret);
        let auth = AuthService::new(users.clone(), blacklist.clone(), codec);

        Self {
            config: Arc::new(config),
            users,
            blacklist,
            auth,
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the authentication service
    #[inline]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
