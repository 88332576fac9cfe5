//! Command handlers
//!
//! One async fn per command. Each takes the storage capability explicitly
//! and returns a ready `ApiResponse`.

pub mod game_info;
pub mod reviews;
pub mod users;

use crate::event::ApiResponse;
use crate::models::ReadyResponse;
use axum::http::StatusCode;

/// Empty or unknown action: echo the method and action back.
pub fn ready(method: &str, action: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::OK,
        &ReadyResponse {
            message: "API ready",
            method,
            action,
        },
    )
}
