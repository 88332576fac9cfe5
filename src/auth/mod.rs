//! Authentication and authorization module
//!
//! Password handling for login/register and the policy deciding where a new
//! review's approval comes from.

mod password;

pub use password::PasswordPolicy;

use std::str::FromStr;

/// Source of `is_approved` for a newly created review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminFlagMode {
    /// Use the `is_admin` flag sent by the client
    #[default]
    Trust,
    /// Use the stored `users.is_admin` of the review's author
    Verify,
}

impl FromStr for AdminFlagMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Ok(AdminFlagMode::Trust),
            "verify" => Ok(AdminFlagMode::Verify),
            other => Err(format!("unknown admin flag mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for AdminFlagMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminFlagMode::Trust => write!(f, "trust"),
            AdminFlagMode::Verify => write!(f, "verify"),
        }
    }
}
