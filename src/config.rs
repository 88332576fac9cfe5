//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::auth::{AdminFlagMode, PasswordPolicy};
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub require_tls: bool,
    pub max_pool_size: usize,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("require_tls", &self.require_tls)
            .field("max_pool_size", &self.max_pool_size)
            .finish_non_exhaustive()
    }
}

/// Which storage backend the router talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// In-process tables, lost on restart
    Memory,
}

/// Credential and moderation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityConfig {
    pub passwords: PasswordPolicy,
    pub admin_flag: AdminFlagMode,
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub security: SecurityConfig,
}

const DEFAULT_POOL_SIZE: usize = 10;
/// Costs bcrypt accepts
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: parse_or(&lookup, "HOST", ServerConfig::default().host)?,
            port: parse_or(&lookup, "PORT", ServerConfig::default().port)?,
        };

        let storage = match lookup("STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "STORAGE must be 'postgres' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let max_pool_size = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_POOL_SIZE)?;
        let database = match lookup("DATABASE_URL") {
            Some(url) => Some(Self::parse_database_url(&url, max_pool_size)?),
            None if storage == StorageBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL".to_string()))
            }
            None => None,
        };

        let mut passwords = match lookup("PASSWORD_MODE") {
            Some(mode) => mode.parse().map_err(ConfigError::InvalidValue)?,
            None => PasswordPolicy::default(),
        };
        if let PasswordPolicy::Bcrypt { cost } = &mut passwords {
            *cost = parse_or(&lookup, "BCRYPT_COST", *cost)?;
            if !BCRYPT_COST_RANGE.contains(cost) {
                return Err(ConfigError::InvalidValue(format!(
                    "BCRYPT_COST must be between {} and {}, got {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end(),
                    cost
                )));
            }
        }

        let security = SecurityConfig {
            passwords,
            admin_flag: match lookup("ADMIN_FLAG_MODE") {
                Some(mode) => mode.parse().map_err(ConfigError::InvalidValue)?,
                None => AdminFlagMode::default(),
            },
        };

        Ok(Self {
            server,
            storage,
            database,
            security,
        })
    }

    /// Parse a DATABASE_URL connection string (postgresql://...)
    fn parse_database_url(url: &str, max_pool_size: usize) -> Result<DatabaseConfig, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue(
                "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
            )
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported DATABASE_URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue("Missing host in DATABASE_URL".to_string()))?
            .to_string();

        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing database name in DATABASE_URL".to_string(),
            ));
        }

        let require_tls = parsed
            .query_pairs()
            .any(|(k, v)| k == "sslmode" && (v == "require" || v == "verify-full"));

        Ok(DatabaseConfig {
            host,
            port: parsed.port().unwrap_or(5432),
            user: parsed.username().to_string(),
            password: parsed.password().map(|p| p.to_string()).unwrap_or_default(),
            database,
            require_tls,
            max_pool_size,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{}='{}'", key, raw))),
        None => Ok(default),
    }
}
