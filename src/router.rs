//! Request router
//!
//! Entry point for one invocation: pre-flight short-circuit, command
//! resolution, handler execution and error mapping.

use crate::command::Command;
use crate::error::ApiResult;
use crate::event::{ApiEvent, ApiResponse};
use crate::handlers::{self, game_info, reviews, users};
use crate::state::AppState;
use tracing::{debug, info_span, Instrument};

/// Handle one event. Always produces a response; failures become JSON
/// error bodies carrying the CORS origin header.
pub async fn dispatch(event: &ApiEvent, state: &AppState) -> ApiResponse {
    if event.is_preflight() {
        return ApiResponse::preflight();
    }

    let span = info_span!("dispatch", method = %event.http_method, action = %event.action());

    async move {
        let response = match execute(event, state).await {
            Ok(response) => response,
            Err(e) => e.into_api_response(),
        };
        debug!(status = response.status_code, "Dispatch complete");
        response
    }
    .instrument(span)
    .await
}

async fn execute(event: &ApiEvent, state: &AppState) -> ApiResult<ApiResponse> {
    let command = Command::from_event(event)?;
    debug!(command = command.name(), "Resolved command");

    let store = state.store.as_ref();
    match command {
        Command::GetReviews => reviews::list(store).await,
        Command::CreateReview(review) => reviews::create(store, review, state.admin_flag).await,
        Command::UpdateReview { id, change } => reviews::update(store, id, change).await,
        Command::DeleteReview { id } => reviews::delete(store, id).await,
        Command::Login(creds) => users::login(store, creds, state.passwords).await,
        Command::Register(creds) => users::register(store, creds, state.passwords).await,
        Command::GetGameInfo => game_info::get(store).await,
        Command::UpdateGameInfo(update) => game_info::update(store, update).await,
        Command::Ready { action } => Ok(handlers::ready(&event.http_method, &action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AdminFlagMode, PasswordPolicy};
    use crate::config::SecurityConfig;
    use crate::db::{MemoryStore, Store};
    use crate::error::AppError;
    use crate::event::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, MAX_AGE};
    use crate::models::{GameInfo, GameInfoUpdate, NewReview, Review, User, UserRecord};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails every call and counts how often it was reached
    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl BrokenStore {
        fn fail<T>(&self) -> Result<T, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Internal("storage offline".to_string()))
        }
    }

    #[async_trait]
    impl Store for BrokenStore {
        async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
            self.fail()
        }
        async fn insert_review(&self, _: &NewReview, _: bool) -> Result<i32, AppError> {
            self.fail()
        }
        async fn set_review_approval(&self, _: i32, _: bool) -> Result<u64, AppError> {
            self.fail()
        }
        async fn find_user_by_credentials(&self, _: &str, _: &str) -> Result<Option<UserRecord>, AppError> {
            self.fail()
        }
        async fn find_users_by_username(&self, _: &str) -> Result<Vec<UserRecord>, AppError> {
            self.fail()
        }
        async fn find_user_by_id(&self, _: i32) -> Result<Option<UserRecord>, AppError> {
            self.fail()
        }
        async fn insert_user(&self, _: &str, _: &str) -> Result<User, AppError> {
            self.fail()
        }
        async fn latest_game_info(&self) -> Result<Option<GameInfo>, AppError> {
            self.fail()
        }
        async fn update_game_info(&self, _: &GameInfoUpdate) -> Result<u64, AppError> {
            self.fail()
        }
    }

    fn state_with(store: Arc<dyn Store>, security: SecurityConfig) -> AppState {
        AppState::new(store, security)
    }

    fn memory_state() -> AppState {
        state_with(
            Arc::new(MemoryStore::new()),
            SecurityConfig {
                passwords: PasswordPolicy::Bcrypt { cost: 4 },
                admin_flag: AdminFlagMode::Trust,
            },
        )
    }

    #[tokio::test]
    async fn test_preflight_never_reaches_storage() {
        let store = Arc::new(BrokenStore::default());
        let state = state_with(store.clone(), SecurityConfig::default());

        let event = ApiEvent::new("OPTIONS").with_query("action", "get_reviews");
        let response = dispatch(&event, &state).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "");
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(response.header(ALLOW_METHODS), Some("GET, POST, PUT, DELETE, OPTIONS"));
        assert_eq!(response.header(ALLOW_HEADERS), Some("Content-Type, X-User-Id, X-Auth-Token"));
        assert_eq!(response.header(MAX_AGE), Some("86400"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_with_cors() {
        let store = Arc::new(BrokenStore::default());
        let state = state_with(store.clone(), SecurityConfig::default());

        let event = ApiEvent::new("GET").with_query("action", "get_reviews");
        let response = dispatch(&event, &state).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status_code, 500);
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert!(response.json_body().unwrap()["error"].is_string());
    }

    #[tokio::test]
    async fn test_ready_echoes_method_and_action() {
        let state = memory_state();

        let response = dispatch(&ApiEvent::new("PUT").with_query("action", "nope"), &state).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"message": "API ready", "method": "PUT", "action": "nope"})
        );

        let response = dispatch(&ApiEvent::new("GET"), &state).await;
        assert_eq!(
            response.json_body().unwrap(),
            json!({"message": "API ready", "method": "GET", "action": ""})
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let state = memory_state();
        let event = ApiEvent::new("POST")
            .with_query("action", "register")
            .with_body("{\"username\":");

        let response = dispatch(&event, &state).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert!(response.json_body().unwrap()["error"]
            .as_str()
            .unwrap()
            .starts_with("Malformed JSON body"));
    }

    #[tokio::test]
    async fn test_delete_without_id_is_400() {
        let state = memory_state();
        let event = ApiEvent::new("DELETE").with_query("action", "delete_review");

        let response = dispatch(&event, &state).await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_409() {
        let state = memory_state();
        let event = ApiEvent::new("POST")
            .with_query("action", "register")
            .with_body(r#"{"username": "sam", "password": "pw"}"#);

        assert_eq!(dispatch(&event, &state).await.status_code, 201);
        let response = dispatch(&event, &state).await;
        assert_eq!(response.status_code, 409);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"error": "Username already registered"})
        );
    }

    #[tokio::test]
    async fn test_verify_mode_ignores_client_admin_flag() {
        let store = Arc::new(MemoryStore::new());
        let regular = store.seed_user("player", "pw", false).await;
        let admin = store.seed_user("mod", "pw", true).await;
        let state = state_with(
            store.clone(),
            SecurityConfig {
                passwords: PasswordPolicy::Plaintext,
                admin_flag: AdminFlagMode::Verify,
            },
        );

        for (user_id, claimed) in [(regular.id, true), (admin.id, false)] {
            let body = json!({"user_id": user_id, "rating": 3, "comment": "c", "is_admin": claimed});
            let event = ApiEvent::new("POST")
                .with_query("action", "create_review")
                .with_body(body.to_string());
            assert_eq!(dispatch(&event, &state).await.status_code, 201);
        }

        let reviews = store.list_reviews().await.unwrap();
        let approved: Vec<(&str, bool)> = reviews
            .iter()
            .map(|r| (r.username.as_str(), r.is_approved))
            .collect();
        assert!(approved.contains(&("player", false)));
        assert!(approved.contains(&("mod", true)));
    }

    #[tokio::test]
    async fn test_plaintext_mode_login_against_stored_password() {
        let store = Arc::new(MemoryStore::new());
        let seeded = store.seed_user("legacy", "open-sesame", false).await;
        let state = state_with(
            store,
            SecurityConfig {
                passwords: PasswordPolicy::Plaintext,
                admin_flag: AdminFlagMode::Trust,
            },
        );

        let event = ApiEvent::new("POST")
            .with_query("action", "login")
            .with_body(r#"{"username": "legacy", "password": "open-sesame"}"#);
        let response = dispatch(&event, &state).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"id": seeded.id, "username": "legacy", "is_admin": false})
        );
    }
}
