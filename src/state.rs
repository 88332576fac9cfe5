//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::auth::{AdminFlagMode, PasswordPolicy};
use crate::config::SecurityConfig;
use crate::db::Store;
use std::sync::Arc;

/// Application state shared across all requests
pub struct AppState {
    /// Storage capability handed to every command handler
    pub store: Arc<dyn Store>,

    pub passwords: PasswordPolicy,

    pub admin_flag: AdminFlagMode,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self {
            store,
            passwords: security.passwords,
            admin_flag: security.admin_flag,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
