//! Storage capability
//!
//! Handlers receive a `&dyn Store` explicitly; there is no global
//! connection. `PgStore` is the production backend, `MemoryStore` keeps the
//! same tables in process.

pub mod memory;
pub mod queries;
pub mod service;

pub use memory::MemoryStore;
pub use service::PgStore;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{GameInfo, GameInfoUpdate, NewReview, Review, User, UserRecord};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

#[async_trait]
pub trait Store: Send + Sync {
    /// All reviews with author usernames, newest first
    async fn list_reviews(&self) -> Result<Vec<Review>, AppError>;

    /// Insert a review and return its generated id
    async fn insert_review(&self, review: &NewReview, is_approved: bool) -> Result<i32, AppError>;

    /// Set `is_approved` on one review. Returns the number of rows matched.
    async fn set_review_approval(&self, id: i32, is_approved: bool) -> Result<u64, AppError>;

    /// Exact username and stored-password match
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError>;

    async fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRecord>, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<UserRecord>, AppError>;

    /// Insert a non-admin user with an already-protected password
    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError>;

    /// Highest-id game-info row
    async fn latest_game_info(&self) -> Result<Option<GameInfo>, AppError>;

    /// Overwrite the singleton row and refresh `updated_at`.
    /// Returns the number of rows matched.
    async fn update_game_info(&self, update: &GameInfoUpdate) -> Result<u64, AppError>;
}

/// Create a connection pool with given configuration
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    let pool = if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| AppError::Config(format!("Failed to create TLS pool: {}", e)))?
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))?
    };

    info!(
        host = %config.host,
        database = %config.database,
        tls = config.require_tls,
        max_size = config.max_pool_size,
        "Database pool created"
    );
    Ok(pool)
}
