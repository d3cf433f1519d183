//! Authentication extractor
//!
//! Protected handlers take a [`Session`] argument. Extraction runs the
//! authentication check, so a handler only ever sees a verified identity.

use super::cookie::SESSION_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use lnd_shared::AuthenticatedIdentity;

/// Verified session attached to a request
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: AuthenticatedIdentity,
    /// The raw token, needed to revoke it on logout
    pub token: String,
}

/// Token from the `Authorization` header, else from the session cookie.
///
/// The header may carry the bare token or `Bearer <token>`. An empty header
/// counts as absent.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start())
        .map(|value| value.strip_prefix("Bearer").unwrap_or(value).trim())
        .filter(|token| !token.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Session
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = session_token(&parts.headers);

        let identity = app_state.auth().authenticate(token.as_deref()).await?;

        // authenticate() rejects a missing token, so this is always Some here
        let token = token.unwrap_or_default();
        Ok(Session { identity, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bare_authorization_header() {
        let map = headers(&[("authorization", "abc.def.ghi")]);
        assert_eq!(session_token(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(session_token(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let map = headers(&[("authorization", "from-header"), ("cookie", "token=from-cookie")]);
        assert_eq!(session_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_empty_header_falls_back_to_cookie() {
        let map = headers(&[("authorization", ""), ("cookie", "other=1; token=from-cookie")]);
        assert_eq!(session_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_without_token_falls_back_to_cookie() {
        for value in ["Bearer ", "Bearer", "  Bearer   "] {
            let map = headers(&[("authorization", value), ("cookie", "token=from-cookie")]);
            assert_eq!(session_token(&map).as_deref(), Some("from-cookie"));
        }
    }

    #[test]
    fn test_no_token() {
        assert!(session_token(&HeaderMap::new()).is_none());
        assert!(session_token(&headers(&[("cookie", "token=")])).is_none());
    }
}
