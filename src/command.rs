//! Typed commands
//!
//! The `action` query parameter is resolved once, here, into a `Command`
//! carrying its own payload. Handlers never see raw strings or JSON.

use crate::error::{bad_request, ApiResult};
use crate::event::ApiEvent;
use crate::models::{Credentials, GameInfoUpdate, NewReview, ReviewApproval};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Command {
    GetReviews,
    CreateReview(NewReview),
    UpdateReview { id: i32, change: ReviewApproval },
    DeleteReview { id: i32 },
    Login(Credentials),
    Register(Credentials),
    GetGameInfo,
    UpdateGameInfo(GameInfoUpdate),
    /// Empty or unrecognized action
    Ready { action: String },
}

impl Command {
    /// Resolve the event into a command. The body is only parsed for
    /// commands that read it.
    pub fn from_event(event: &ApiEvent) -> ApiResult<Self> {
        let action = event.action();

        let command = match action {
            "get_reviews" => Command::GetReviews,
            "create_review" => Command::CreateReview(payload(event, action)?),
            "update_review" => Command::UpdateReview {
                id: review_id(event)?,
                change: payload(event, action)?,
            },
            "delete_review" => Command::DeleteReview {
                id: review_id(event)?,
            },
            "login" => Command::Login(payload(event, action)?),
            "register" => Command::Register(payload(event, action)?),
            "get_game_info" => Command::GetGameInfo,
            "update_game_info" => Command::UpdateGameInfo(payload(event, action)?),
            other => Command::Ready {
                action: other.to_string(),
            },
        };

        Ok(command)
    }

    /// Name used in logs
    pub fn name(&self) -> &str {
        match self {
            Command::GetReviews => "get_reviews",
            Command::CreateReview(_) => "create_review",
            Command::UpdateReview { .. } => "update_review",
            Command::DeleteReview { .. } => "delete_review",
            Command::Login(_) => "login",
            Command::Register(_) => "register",
            Command::GetGameInfo => "get_game_info",
            Command::UpdateGameInfo(_) => "update_game_info",
            Command::Ready { .. } => "ready",
        }
    }
}

/// Absent or blank body reads as `{}`.
fn body_json(event: &ApiEvent) -> ApiResult<Value> {
    match event.body.as_deref().map(str::trim) {
        None | Some("") => Ok(Value::Object(Default::default())),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| bad_request(format!("Malformed JSON body: {}", e))),
    }
}

fn payload<T: DeserializeOwned>(event: &ApiEvent, action: &str) -> ApiResult<T> {
    let value = body_json(event)?;
    serde_json::from_value(value)
        .map_err(|e| bad_request(format!("Invalid {} payload: {}", action, e)))
}

fn review_id(event: &ApiEvent) -> ApiResult<i32> {
    let raw = event
        .query("id")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad_request("Missing review id"))?;

    raw.parse()
        .map_err(|_| bad_request(format!("Invalid review id: {}", raw)))
}
