//! Password storage and verification
//!
//! Uses bcrypt by default. The plaintext mode stores and compares passwords
//! verbatim, for databases that already hold plaintext credentials.

use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    Bcrypt { cost: u32 },
    Plaintext,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy::Bcrypt { cost: DEFAULT_COST }
    }
}

impl PasswordPolicy {
    /// Turn a submitted password into its stored form
    pub fn protect(&self, password: &str) -> Result<String, AppError> {
        match self {
            PasswordPolicy::Bcrypt { cost } => hash(password, *cost)
                .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e))),
            PasswordPolicy::Plaintext => Ok(password.to_string()),
        }
    }

    /// Check a submitted password against a stored one.
    ///
    /// A stored value that is not a bcrypt hash never matches in bcrypt mode.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match self {
            PasswordPolicy::Bcrypt { .. } => match verify(password, stored) {
                Ok(matched) => matched,
                Err(e) => {
                    debug!("Stored password is not a usable bcrypt hash: {}", e);
                    false
                }
            },
            PasswordPolicy::Plaintext => password == stored,
        }
    }
}

impl FromStr for PasswordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(PasswordPolicy::default()),
            "plaintext" | "plain" => Ok(PasswordPolicy::Plaintext),
            other => Err(format!("unknown password mode '{}'", other)),
        }
    }
}
