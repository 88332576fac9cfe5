//! Error handling module
//!
//! Provides the error taxonomy for the router and its conversion into
//! JSON responses. Every error response keeps the CORS origin header.

use crate::event::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Internal(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side faults get a generic text;
    /// the detail only goes to the log.
    fn client_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Pool(e) => {
                error!("Pool error: {:?}", e);
                "Database connection unavailable".to_string()
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                "A configuration error occurred".to_string()
            }
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
        }
    }

    pub fn into_api_response(self) -> ApiResponse {
        let status = self.status();
        ApiResponse::json(
            status,
            &ErrorResponse {
                error: self.client_message(),
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_api_response().into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a bad request error
pub fn bad_request(msg: impl Into<String>) -> AppError {
    AppError::BadRequest(msg.into())
}
