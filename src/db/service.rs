// PostgreSQL store
//
// Each operation checks out one pooled client; it goes back to the pool
// when the client is dropped, on success and on error alike.

use super::{queries, Store};
use crate::error::AppError;
use crate::models::{GameInfo, GameInfoUpdate, NewReview, Review, User, UserRecord, GAME_INFO_ID};
use async_trait::async_trait;
use deadpool_postgres::{Client, Pool};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use tracing::{debug, info};

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Wrap a pool after checking that it can reach the database
    pub async fn connect(pool: Pool) -> Result<Self, AppError> {
        let client = pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        drop(client);

        info!("✅ Database connection verified");
        Ok(Self::new(pool))
    }

    async fn client(&self) -> Result<Client, AppError> {
        Ok(self.pool.get().await?)
    }
}

fn user_record(row: &Row) -> Result<UserRecord, AppError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        is_admin: row.try_get("is_admin")?,
    })
}

fn review(row: &Row) -> Result<Review, AppError> {
    Ok(Review {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        rating: row.try_get("rating")?,
        comment: row.try_get("comment")?,
        is_approved: row.try_get("is_approved")?,
        created_at: row.try_get("created_at")?,
    })
}

fn game_info(row: &Row) -> Result<GameInfo, AppError> {
    Ok(GameInfo {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        cover_url: row.try_get("cover_url")?,
        steam_url: row.try_get("steam_url")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Unique violations become `Conflict`; everything else stays a database error.
fn insert_error(e: tokio_postgres::Error, conflict: &str) -> AppError {
    if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        AppError::Conflict(conflict.to_string())
    } else {
        AppError::Database(e)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
        let client = self.client().await?;
        let rows = client.query(queries::LIST_REVIEWS, &[]).await?;
        rows.iter().map(review).collect()
    }

    async fn insert_review(&self, new: &NewReview, is_approved: bool) -> Result<i32, AppError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                queries::INSERT_REVIEW,
                &[&new.user_id, &new.rating, &new.comment, &is_approved],
            )
            .await
            .map_err(|e| insert_error(e, "Review already exists"))?;
        Ok(row.try_get("id")?)
    }

    async fn set_review_approval(&self, id: i32, is_approved: bool) -> Result<u64, AppError> {
        let client = self.client().await?;
        let affected = client
            .execute(queries::SET_REVIEW_APPROVAL, &[&is_approved, &id])
            .await?;
        debug!(review_id = id, is_approved, affected, "Review approval updated");
        Ok(affected)
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let client = self.client().await?;
        let row = client
            .query_opt(queries::FIND_USER_BY_CREDENTIALS, &[&username, &password])
            .await?;
        row.as_ref().map(user_record).transpose()
    }

    async fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRecord>, AppError> {
        let client = self.client().await?;
        let rows = client
            .query(queries::FIND_USERS_BY_USERNAME, &[&username])
            .await?;
        rows.iter().map(user_record).collect()
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<UserRecord>, AppError> {
        let client = self.client().await?;
        let row = client.query_opt(queries::FIND_USER_BY_ID, &[&id]).await?;
        row.as_ref().map(user_record).transpose()
    }

    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let client = self.client().await?;
        let row = client
            .query_one(queries::INSERT_USER, &[&username, &password])
            .await
            .map_err(|e| insert_error(e, "Username already registered"))?;

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            is_admin: row.try_get("is_admin")?,
        })
    }

    async fn latest_game_info(&self) -> Result<Option<GameInfo>, AppError> {
        let client = self.client().await?;
        let row = client.query_opt(queries::LATEST_GAME_INFO, &[]).await?;
        row.as_ref().map(game_info).transpose()
    }

    async fn update_game_info(&self, update: &GameInfoUpdate) -> Result<u64, AppError> {
        let client = self.client().await?;
        let affected = client
            .execute(
                queries::UPDATE_GAME_INFO,
                &[
                    &update.title,
                    &update.description,
                    &update.cover_url,
                    &update.steam_url,
                    &GAME_INFO_ID,
                ],
            )
            .await?;
        debug!(affected, "Game info updated");
        Ok(affected)
    }
}
