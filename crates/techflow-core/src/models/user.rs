use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user's profile as returned by the server.
///
/// Replaced wholesale on re-login; never mutated field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Response from `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"token":"eyJhbGciOiJIUzI1NiJ9.payload.sig","user":{"id":"u-42","email":"ana@example.com","name":"Ana Torres","createdAt":"2025-11-03T18:22:45.000Z"}}"#;

        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth response");
        assert_eq!(resp.token, "eyJhbGciOiJIUzI1NiJ9.payload.sig");
        assert_eq!(resp.user.id, "u-42");
        assert_eq!(resp.user.email, "ana@example.com");
        assert!(resp.user.created_at.is_some());
    }

    #[test]
    fn test_parse_user_without_created_at() {
        let json = r#"{"id":"u-7","email":"b@c.dev","name":"B"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user");
        assert_eq!(user.name, "B");
        assert!(user.created_at.is_none());
    }
}
