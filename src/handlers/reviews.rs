//! Review handlers
//!
//! Listing, creation and moderation. Deleting a review only clears its
//! approval; rows are never removed.

use crate::auth::AdminFlagMode;
use crate::db::Store;
use crate::error::ApiResult;
use crate::event::ApiResponse;
use crate::models::{CreatedResponse, MessageResponse, NewReview, ReviewApproval};
use axum::http::StatusCode;
use tracing::{debug, info, warn};

/// get_reviews
pub async fn list(store: &dyn Store) -> ApiResult<ApiResponse> {
    let reviews = store.list_reviews().await?;
    debug!(count = reviews.len(), "Loaded reviews");
    Ok(ApiResponse::json(StatusCode::OK, &reviews))
}

/// create_review
pub async fn create(
    store: &dyn Store,
    review: NewReview,
    admin_flag: AdminFlagMode,
) -> ApiResult<ApiResponse> {
    let is_approved = match admin_flag {
        AdminFlagMode::Trust => {
            if review.is_admin {
                warn!(
                    user_id = review.user_id,
                    "Review pre-approved from client-declared admin flag"
                );
            }
            review.is_admin
        }
        AdminFlagMode::Verify => store
            .find_user_by_id(review.user_id)
            .await?
            .map(|user| user.is_admin)
            .unwrap_or(false),
    };

    let id = store.insert_review(&review, is_approved).await?;
    info!(review_id = id, user_id = review.user_id, is_approved, "Review created");

    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &CreatedResponse {
            id,
            message: "Review created",
        },
    ))
}

/// update_review. A missing id still answers 200.
pub async fn update(store: &dyn Store, id: i32, change: ReviewApproval) -> ApiResult<ApiResponse> {
    let affected = store.set_review_approval(id, change.is_approved).await?;
    if affected == 0 {
        debug!(review_id = id, "update_review matched no rows");
    }

    Ok(ApiResponse::json(
        StatusCode::OK,
        &MessageResponse::new("Review updated"),
    ))
}

/// delete_review (soft delete)
pub async fn delete(store: &dyn Store, id: i32) -> ApiResult<ApiResponse> {
    let affected = store.set_review_approval(id, false).await?;
    if affected == 0 {
        debug!(review_id = id, "delete_review matched no rows");
    }

    Ok(ApiResponse::json(
        StatusCode::OK,
        &MessageResponse::new("Review deleted"),
    ))
}
