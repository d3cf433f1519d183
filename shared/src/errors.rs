//! Error types shared between the backend and API clients

use thiserror::Error;

/// Authentication and session failures.
///
/// `InvalidCredentials` deliberately covers both an unknown email and a wrong
/// password so callers cannot tell which one happened.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Access denied")]
    Unauthorized,
}

impl AuthError {
    /// Stable machine-readable code used in error response bodies
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailInUse => "EMAIL_IN_USE",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Revoked => "REVOKED",
            AuthError::Unauthorized => "UNAUTHORIZED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::EmailInUse, "EMAIL_IN_USE")]
    #[case(AuthError::InvalidCredentials, "INVALID_CREDENTIALS")]
    #[case(AuthError::InvalidToken, "INVALID_TOKEN")]
    #[case(AuthError::Revoked, "REVOKED")]
    #[case(AuthError::Unauthorized, "UNAUTHORIZED")]
    fn test_error_codes(#[case] error: AuthError, #[case] code: &str) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_credentials_message_does_not_leak_cause() {
        let message = AuthError::InvalidCredentials.to_string();
        assert!(!message.to_lowercase().contains("unknown"));
        assert!(!message.to_lowercase().contains("not found"));
    }
}
