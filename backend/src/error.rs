//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lnd_shared::{AuthError, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The auth failure behind this error, if any
    pub fn auth_error(&self) -> Option<AuthError> {
        match self {
            ApiError::Auth(err) => Some(*err),
            _ => None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

fn auth_status(err: AuthError) -> StatusCode {
    match err {
        AuthError::EmailInUse | AuthError::InvalidCredentials | AuthError::InvalidToken => {
            StatusCode::BAD_REQUEST
        }
        AuthError::Revoked | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Auth(err) => (auth_status(*err), err.code(), err.to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::EmailInUse, StatusCode::BAD_REQUEST)]
    #[case(AuthError::InvalidCredentials, StatusCode::BAD_REQUEST)]
    #[case(AuthError::InvalidToken, StatusCode::BAD_REQUEST)]
    #[case(AuthError::Revoked, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::Unauthorized, StatusCode::UNAUTHORIZED)]
    fn test_auth_error_status(#[case] err: AuthError, #[case] status: StatusCode) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);
    }

    #[test]
    fn test_validation_error_status() {
        let response = ApiError::Validation("Invalid email format".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response =
            ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.7")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Server error"));
        assert!(!body.contains("10.0.0.7"));
    }
}
