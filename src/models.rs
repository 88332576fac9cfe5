//! Data models and DTOs (Data Transfer Objects)
//!
//! Stored records, request payloads and the small response bodies used by
//! the handlers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Stored records
// ============================================

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// User row including the stored password (plaintext or bcrypt hash)
#[derive(Clone)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            is_admin: record.is_admin,
        }
    }
}

/// Review joined with its author's username
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: i32,
    pub username: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_approved: bool,
    #[serde(serialize_with = "timestamp::serialize_opt")]
    pub created_at: Option<NaiveDateTime>,
}

/// The game-info singleton row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameInfo {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub steam_url: Option<String>,
    #[serde(serialize_with = "timestamp::serialize_opt")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Row id of the game-info singleton
pub const GAME_INFO_ID: i32 = 1;

// ============================================
// Request payloads
// ============================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub user_id: i32,
    pub rating: i32,
    pub comment: String,
    /// Caller-declared admin status; seeds `is_approved`.
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApproval {
    pub is_approved: bool,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Absent fields are written as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameInfoUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub steam_url: Option<String>,
}

// ============================================
// Response bodies
// ============================================

/// Message-only response (no data)
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
    pub message: &'static str,
}

/// Echo returned for an empty or unknown action
#[derive(Debug, Serialize)]
pub struct ReadyResponse<'a> {
    pub message: &'static str,
    pub method: &'a str,
    pub action: &'a str,
}

/// Timestamps go out as `YYYY-MM-DD HH:MM:SS[.ffffff]`.
pub mod timestamp {
    use chrono::{NaiveDateTime, Timelike};
    use serde::Serializer;

    pub fn format(value: &NaiveDateTime) -> String {
        if value.nanosecond() == 0 {
            value.format("%Y-%m-%d %H:%M:%S").to_string()
        } else {
            value.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
        }
    }

    pub fn serialize_opt<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&format(v)),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_review_serializes_timestamp_as_string() {
        let created_at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(17, 4, 5, 120)
            .unwrap();
        let review = Review {
            id: 7,
            username: "ash".to_string(),
            rating: 4,
            comment: Some("solid".to_string()),
            is_approved: false,
            created_at: Some(created_at),
        };

        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["created_at"], "2024-03-09 17:04:05.000120");
        assert_eq!(value["username"], "ash");
    }

    #[test]
    fn test_review_without_timestamp_serializes_null() {
        let review = Review {
            id: 8,
            username: "ash".to_string(),
            rating: 3,
            comment: None,
            is_approved: true,
            created_at: None,
        };

        let value = serde_json::to_value(&review).unwrap();
        assert!(value["created_at"].is_null());
        assert!(value["comment"].is_null());
        assert_eq!(value["id"], 8);
    }

    #[test]
    fn test_whole_second_timestamp_has_no_fraction() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(timestamp::format(&ts), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_new_review_admin_flag_defaults_false() {
        let review: NewReview =
            serde_json::from_value(json!({"user_id": 1, "rating": 5, "comment": "x"})).unwrap();
        assert!(!review.is_admin);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "a".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_game_info_update_missing_fields_are_none() {
        let update: GameInfoUpdate = serde_json::from_value(json!({"title": "T"})).unwrap();
        assert_eq!(update.title.as_deref(), Some("T"));
        assert!(update.steam_url.is_none());
    }
}
