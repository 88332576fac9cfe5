//! Game Review API
//!
//! A single-function request handler for a game's landing page: reviews with
//! moderation, user login/registration, and one editable game-info record.
//! Requests arrive as normalized events (method, query parameters, JSON body)
//! and are resolved into typed commands run against a storage capability.

pub mod auth;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod handlers;
pub mod models;
pub mod router;
pub mod routes;
pub mod state;

pub use command::Command;
pub use error::{AppError, ApiResult};
pub use event::{ApiEvent, ApiResponse};
pub use router::dispatch;
pub use state::{AppState, SharedState};
