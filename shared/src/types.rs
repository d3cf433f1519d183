//! API request and response types

use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Generic `{ "message": ... }` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response; the same token is also set as the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Current session owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub name: String,
    pub user_id: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_response_uses_camel_case() {
        let body = RegisterResponse {
            message: "User created".to_string(),
            user_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userId"], "abc");
    }

    #[test]
    fn test_me_response_shape() {
        let body = MeResponse {
            name: "alice".to_string(),
            user_id: "42".to_string(),
            email: "alice@x.com".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["userId"], "42");
        assert_eq!(json["email"], "alice@x.com");
    }
}
