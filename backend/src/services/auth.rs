//! Authentication service: register, login, logout and per-request
//! identity verification
//!
//! The service owns no connections of its own. Stores arrive through the
//! constructor so tests can swap in the in-memory implementations.

use crate::auth::{PasswordService, SessionTokenCodec};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{CredentialStore, NewUser, StoreError, TokenBlacklist};
use lnd_shared::{AuthError, AuthenticatedIdentity, Role};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    codec: SessionTokenCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        codec: SessionTokenCodec,
    ) -> Self {
        Self {
            users,
            blacklist,
            codec,
        }
    }

    pub fn codec(&self) -> &SessionTokenCodec {
        &self.codec
    }

    /// Create a `user`-role account. Only the email has to be unique.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<Uuid> {
        if username.trim().is_empty() {
            return Err(ApiError::Validation("Username is required".to_string()));
        }
        if !email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }
        if password.is_empty() {
            return Err(ApiError::Validation("Password is required".to_string()));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailInUse.into());
        }

        let password_hash = PasswordService::hash_async(password.to_string()).await?;

        let id = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                StoreError::DuplicateKey => ApiError::from(AuthError::EmailInUse),
                StoreError::Backend(err) => ApiError::Internal(err),
            })?;

        info!(user_id = %id, "User registered");
        Ok(id)
    }

    /// Issue a fresh session token.
    ///
    /// A token already held by the caller is revoked first, before the new
    /// credentials are looked at, so a failed login still ends the old session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        presented: Option<&str>,
    ) -> ApiResult<String> {
        if let Some(token) = presented {
            self.revoke_presented(token).await?;
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.codec.sign(&AuthenticatedIdentity {
            subject_id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.username.clone(),
        })?;

        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Blacklist the token until its own expiry
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        let claims = self.codec.verify(token).map_err(|e| {
            debug!("Logout with unusable token: {}", e);
            AuthError::InvalidToken
        })?;

        self.blacklist.insert(token, claims.expires_at).await?;

        info!(user_id = %claims.identity.subject_id, "User logged out");
        Ok(())
    }

    /// Resolve the identity behind a request token.
    ///
    /// The blacklist is consulted before the signature, so a revoked token is
    /// reported as `Revoked` even while it would still verify.
    pub async fn authenticate(&self, token: Option<&str>) -> ApiResult<AuthenticatedIdentity> {
        let token = token.ok_or(AuthError::Unauthorized)?;

        if self.blacklist.exists(token).await? {
            return Err(AuthError::Revoked.into());
        }

        let claims = self.codec.verify(token).map_err(|e| {
            debug!("Rejected session token: {}", e);
            AuthError::InvalidToken
        })?;

        Ok(claims.identity)
    }

    async fn revoke_presented(&self, token: &str) -> ApiResult<()> {
        match self.codec.revocation_expiry(token) {
            Some(expires_at) => {
                self.blacklist.insert(token, expires_at).await?;
                debug!("Revoked previous session before login");
            }
            // Forged or already expired: it can never authenticate anyway
            None => debug!("Previous session token not revocable, dropping it"),
        }
        Ok(())
    }
}
