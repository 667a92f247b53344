//! Domain DTOs for the Tabas API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently;
//! the end-to-end tests catch drift between the two crates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author_id: u64,
}

/// Request payload for `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// Request payload for `POST /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub author_id: u64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// ISO-8601 time the server answered, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// `{message}` body the server sends with every error status.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_uses_camel_case() {
        let input = CreatePost {
            title: "T".to_string(),
            content: "C".to_string(),
            author_id: 3,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["authorId"], 3);
    }

    #[test]
    fn health_environment_is_optional() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status":"OK","message":"Backend server is running!"}"#)
                .unwrap();
        assert!(health.is_ok());
        assert!(health.environment.is_none());
        assert!(health.timestamp.is_none());
    }
}
