//! In-memory store
//!
//! Keeps the three tables in process behind a `RwLock`. Mirrors the
//! database's behavior where handlers can observe it: generated ids, the
//! users/reviews join, unique usernames, the reviews foreign key and the
//! `id = 1` game-info update.

use super::Store;
use crate::error::AppError;
use crate::models::{GameInfo, GameInfoUpdate, NewReview, Review, User, UserRecord, GAME_INFO_ID};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredReview {
    id: i32,
    user_id: i32,
    rating: i32,
    comment: Option<String>,
    is_approved: bool,
    created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    reviews: Vec<StoredReview>,
    game_info: Vec<GameInfo>,
    last_user_id: i32,
    last_review_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a game-info row already present
    pub fn with_game_info(info: GameInfo) -> Self {
        Self {
            tables: RwLock::new(Tables {
                game_info: vec![info],
                ..Tables::default()
            }),
        }
    }

    /// Insert a user directly, bypassing registration (admin accounts)
    pub async fn seed_user(&self, username: &str, password: &str, is_admin: bool) -> User {
        let mut tables = self.tables.write().await;
        tables.last_user_id += 1;
        let record = UserRecord {
            id: tables.last_user_id,
            username: username.to_string(),
            password: password.to_string(),
            is_admin,
        };
        tables.users.push(record.clone());
        record.into()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
        let tables = self.tables.read().await;

        let mut joined: Vec<Review> = tables
            .reviews
            .iter()
            .filter_map(|r| {
                let author = tables.users.iter().find(|u| u.id == r.user_id)?;
                Some(Review {
                    id: r.id,
                    username: author.username.clone(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                    is_approved: r.is_approved,
                    created_at: Some(r.created_at),
                })
            })
            .collect();

        joined.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(joined)
    }

    async fn insert_review(&self, new: &NewReview, is_approved: bool) -> Result<i32, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == new.user_id) {
            return Err(AppError::Internal(format!(
                "reviews.user_id {} violates foreign key to users",
                new.user_id
            )));
        }

        tables.last_review_id += 1;
        let id = tables.last_review_id;
        tables.reviews.push(StoredReview {
            id,
            user_id: new.user_id,
            rating: new.rating,
            comment: Some(new.comment.clone()),
            is_approved,
            created_at: now(),
        });
        Ok(id)
    }

    async fn set_review_approval(&self, id: i32, is_approved: bool) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for review in tables.reviews.iter_mut().filter(|r| r.id == id) {
            review.is_approved = is_approved;
            affected += 1;
        }
        Ok(affected)
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }

    async fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.username == username)
            .cloned()
            .collect())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }

        tables.last_user_id += 1;
        let record = UserRecord {
            id: tables.last_user_id,
            username: username.to_string(),
            password: password.to_string(),
            is_admin: false,
        };
        tables.users.push(record.clone());
        Ok(record.into())
    }

    async fn latest_game_info(&self) -> Result<Option<GameInfo>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.game_info.iter().max_by_key(|g| g.id).cloned())
    }

    async fn update_game_info(&self, update: &GameInfoUpdate) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for row in tables.game_info.iter_mut().filter(|g| g.id == GAME_INFO_ID) {
            row.title = update.title.clone();
            row.description = update.description.clone();
            row.cover_url = update.cover_url.clone();
            row.steam_url = update.steam_url.clone();
            row.updated_at = Some(now());
            affected += 1;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_for(user_id: i32, comment: &str) -> NewReview {
        NewReview {
            user_id,
            rating: 5,
            comment: comment.to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_reviews_newest_first_with_username() {
        let store = MemoryStore::new();
        let user = store.insert_user("kim", "pw").await.unwrap();

        let first = store.insert_review(&review_for(user.id, "first"), false).await.unwrap();
        let second = store.insert_review(&review_for(user.id, "second"), true).await.unwrap();

        let reviews = store.list_reviews().await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, second);
        assert_eq!(reviews[1].id, first);
        assert_eq!(reviews[0].username, "kim");
        assert!(reviews[0].is_approved);
    }

    #[tokio::test]
    async fn test_review_requires_existing_user() {
        let store = MemoryStore::new();
        let result = store.insert_review(&review_for(99, "orphan"), false).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.insert_user("dup", "a").await.unwrap();
        assert!(matches!(
            store.insert_user("dup", "b").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_approval_on_missing_review_matches_nothing() {
        let store = MemoryStore::new();
        assert_eq!(store.set_review_approval(42, true).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_game_info_update_only_touches_singleton() {
        let store = MemoryStore::new();
        let update = GameInfoUpdate {
            title: Some("T".to_string()),
            ..GameInfoUpdate::default()
        };

        assert_eq!(store.update_game_info(&update).await.unwrap(), 0);
        assert!(store.latest_game_info().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_admin_is_admin() {
        let store = MemoryStore::new();
        let admin = store.seed_user("root", "pw", true).await;

        let found = store.find_user_by_id(admin.id).await.unwrap().unwrap();
        assert!(found.is_admin);
    }
}
