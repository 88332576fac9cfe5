//! Game-info handlers

use crate::db::Store;
use crate::error::ApiResult;
use crate::event::ApiResponse;
use crate::models::{GameInfoUpdate, MessageResponse};
use axum::http::StatusCode;
use tracing::{info, warn};

/// get_game_info: latest row, or `{}` when the table is empty
pub async fn get(store: &dyn Store) -> ApiResult<ApiResponse> {
    let response = match store.latest_game_info().await? {
        Some(info) => ApiResponse::json(StatusCode::OK, &info),
        None => ApiResponse::json(StatusCode::OK, &serde_json::json!({})),
    };
    Ok(response)
}

/// update_game_info: overwrite the singleton, 200 even when it is missing
pub async fn update(store: &dyn Store, update: GameInfoUpdate) -> ApiResult<ApiResponse> {
    let affected = store.update_game_info(&update).await?;
    if affected == 0 {
        warn!("update_game_info matched no rows; game_info row 1 does not exist");
    } else {
        info!("Game info updated");
    }

    Ok(ApiResponse::json(
        StatusCode::OK,
        &MessageResponse::new("Game info updated"),
    ))
}
