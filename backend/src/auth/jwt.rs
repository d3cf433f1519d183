//! Session token signing and verification
//!
//! Tokens are HS256 JWTs carrying `{userId, email, name, iat, exp, jti}`. Keys are
//! derived once at startup and shared through `AppState`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use lnd_shared::AuthenticatedIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of a session token and of the cookie carrying it
pub const SESSION_TTL_SECS: i64 = 3600;

/// Why a token was rejected. All variants surface as `AuthError::InvalidToken`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("malformed or tampered token: {0}")]
    Invalid(String),

    #[error("missing claim `{0}`")]
    MissingClaim(&'static str),
}

/// Claims as they appear on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireClaims {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
    /// Makes every issued token unique, even within the same second
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

/// A verified session token
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub identity: AuthenticatedIdentity,
    pub expires_at: DateTime<Utc>,
}

/// Pre-computed signing keys
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Signs and verifies session tokens
///
/// Cheap to clone; build it once at startup.
#[derive(Clone)]
pub struct SessionTokenCodec {
    keys: TokenKeys,
}

impl SessionTokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            keys: TokenKeys::new(secret),
        }
    }

    /// Sign a token for `identity` that expires one hour from now
    pub fn sign(&self, identity: &AuthenticatedIdentity) -> anyhow::Result<String> {
        self.sign_at(identity, Utc::now())
    }

    fn sign_at(
        &self,
        identity: &AuthenticatedIdentity,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let exp = issued_at + Duration::seconds(SESSION_TTL_SECS);
        let claims = WireClaims {
            user_id: Some(identity.subject_id.clone()),
            email: Some(identity.email.clone()),
            name: Some(identity.display_name.clone()),
            iat: Some(issued_at.timestamp()),
            exp: exp.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {}", e))
    }

    /// Verify signature and expiry, then require the identity claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<WireClaims>(token, &self.keys.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        let expires_at = timestamp(claims.exp)?;
        // jsonwebtoken accepts exp == now; the session is over at that instant.
        if expires_at <= Utc::now() {
            return Err(TokenError::Expired);
        }

        let identity = AuthenticatedIdentity {
            subject_id: claims.user_id.ok_or(TokenError::MissingClaim("userId"))?,
            email: claims.email.ok_or(TokenError::MissingClaim("email"))?,
            display_name: claims.name.ok_or(TokenError::MissingClaim("name"))?,
        };

        Ok(SessionClaims {
            identity,
            expires_at,
        })
    }

    /// Expiry to record when revoking `token`.
    ///
    /// Checks the signature but not the expiry. Returns `None` when the token is
    /// forged, malformed or already expired: none of those can ever pass
    /// `verify`, so there is nothing to revoke.
    pub fn revocation_expiry(&self, token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<WireClaims>(token, &self.keys.decoding, &validation)
            .ok()?
            .claims;

        timestamp(claims.exp)
            .ok()
            .filter(|expires_at| *expires_at > Utc::now())
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::Invalid(format!("exp out of range: {}", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> SessionTokenCodec {
        SessionTokenCodec::new("test-secret")
    }

    fn alice() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            subject_id: "b7c1a7c2-1f0e-4c8e-9f51-0d6f1c1b2a3d".to_string(),
            email: "alice@x.com".to_string(),
            display_name: "alice".to_string(),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let codec = codec();
        let token = codec.sign(&alice()).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.identity, alice());
        let remaining = claims.expires_at - Utc::now();
        assert!(remaining <= Duration::seconds(SESSION_TTL_SECS));
        assert!(remaining > Duration::seconds(SESSION_TTL_SECS - 10));
    }

    #[test]
    fn test_tokens_are_unique() {
        let codec = codec();
        assert_ne!(codec.sign(&alice()).unwrap(), codec.sign(&alice()).unwrap());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(SESSION_TTL_SECS + 1);
        let token = codec.sign_at(&alice(), issued).unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
        assert!(codec.revocation_expiry(&token).is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = SessionTokenCodec::new("other-secret").sign(&alice()).unwrap();

        assert!(matches!(codec().verify(&token), Err(TokenError::Invalid(_))));
        assert!(codec().revocation_expiry(&token).is_none());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.sign(&alice()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let other = codec
            .sign(&AuthenticatedIdentity {
                subject_id: "someone-else".to_string(),
                ..alice()
            })
            .unwrap();
        parts[1] = other.split('.').nth(1).unwrap().to_string();

        assert!(codec.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn test_missing_claim_rejected() {
        let codec = codec();
        let claims = WireClaims {
            user_id: Some("1".to_string()),
            email: Some("alice@x.com".to_string()),
            name: None,
            iat: None,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            jti: None,
        };
        let token = encode(&Header::default(), &claims, &codec.keys.encoding).unwrap();

        assert_eq!(
            codec.verify(&token).unwrap_err(),
            TokenError::MissingClaim("name")
        );
        // Still a genuine, unexpired token: revocable
        assert!(codec.revocation_expiry(&token).is_some());
    }

    #[test]
    fn test_revocation_expiry_matches_token_expiry() {
        let codec = codec();
        let token = codec.sign(&alice()).unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(codec.revocation_expiry(&token), Some(verified.expires_at));
    }

    proptest! {
        #[test]
        fn prop_garbage_never_verifies(input in "\\PC{0,200}") {
            let codec = codec();
            prop_assert!(codec.verify(&input).is_err());
            prop_assert!(codec.revocation_expiry(&input).is_none());
        }

        #[test]
        fn prop_three_segment_noise_never_verifies(
            token in "[a-zA-Z0-9_-]{10,40}\\.[a-zA-Z0-9_-]{10,40}\\.[a-zA-Z0-9_-]{10,40}"
        ) {
            prop_assert!(codec().verify(&token).is_err());
        }
    }
}
