//! Account handlers: login and registration

use crate::auth::PasswordPolicy;
use crate::db::Store;
use crate::error::{ApiResult, AppError};
use crate::event::ApiResponse;
use crate::models::{Credentials, User, UserRecord};
use axum::http::StatusCode;
use tracing::info;

/// login
///
/// Plaintext mode matches username and password in one lookup. Bcrypt mode
/// loads every account with that username and verifies each hash.
pub async fn login(
    store: &dyn Store,
    creds: Credentials,
    passwords: PasswordPolicy,
) -> ApiResult<ApiResponse> {
    let found: Option<UserRecord> = match passwords {
        PasswordPolicy::Plaintext => {
            store
                .find_user_by_credentials(&creds.username, &creds.password)
                .await?
        }
        PasswordPolicy::Bcrypt { .. } => store
            .find_users_by_username(&creds.username)
            .await?
            .into_iter()
            .find(|candidate| passwords.verify(&creds.password, &candidate.password)),
    };

    let user: User = found
        .ok_or_else(|| {
            info!(username = %creds.username, "Login rejected");
            AppError::Unauthorized("Invalid credentials".to_string())
        })?
        .into();

    info!(user_id = user.id, "Login succeeded");
    Ok(ApiResponse::json(StatusCode::OK, &user))
}

/// register. New accounts are never admins.
pub async fn register(
    store: &dyn Store,
    creds: Credentials,
    passwords: PasswordPolicy,
) -> ApiResult<ApiResponse> {
    let stored = passwords.protect(&creds.password)?;
    let user = store.insert_user(&creds.username, &stored).await?;

    info!(user_id = user.id, username = %user.username, "User registered");
    Ok(ApiResponse::json(StatusCode::CREATED, &user))
}
