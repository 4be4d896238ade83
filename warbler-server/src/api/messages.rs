use axum::{
    extract::{Path, State},
    response::Response,
    Form, Json,
};

use warbler_types::{MessageForm, MessagePage, MAX_MESSAGE_LENGTH};

use super::{ApiError, ApiResult};
use crate::db::repositories::{LikeRepository, MessageRepository, UserRepository};
use crate::middleware::{found, AuthUser};
use crate::state::AppState;

/// Reject blank bodies and anything past the character limit
pub fn validate_message_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message text cannot be empty".to_string()));
    }
    let length = text.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Message exceeds {} character limit (current: {})",
            MAX_MESSAGE_LENGTH, length
        )));
    }
    Ok(())
}

/// POST /messages/new - Post a message as the current user
pub async fn create_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<MessageForm>,
) -> ApiResult<Response> {
    validate_message_text(&form.text)?;

    let message = MessageRepository::new(state.db.pool.clone()).create(user.id, &form.text)?;
    tracing::info!("User {} posted message {}", user.id, message.id);

    Ok(found(&format!("/users/{}", user.id)))
}

/// GET /messages/:id - Show a message with its author
pub async fn show_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> ApiResult<Json<MessagePage>> {
    let pool = state.db.pool.clone();

    let message = MessageRepository::new(pool.clone())
        .get_by_id(message_id)?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    let user = UserRepository::new(pool.clone())
        .get_by_id(message.user_id)?
        .ok_or_else(|| ApiError::InternalError(format!("Author of message {} missing", message.id)))?;

    let like_count = LikeRepository::new(pool).count_for_message(message.id)?;

    Ok(Json(MessagePage {
        message,
        user,
        like_count,
    }))
}

/// POST /messages/:id/delete - Delete one of the current user's messages
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<i64>,
) -> ApiResult<Response> {
    let repo = MessageRepository::new(state.db.pool.clone());

    let message = repo
        .get_by_id(message_id)?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    if message.user_id != user.id {
        tracing::warn!(
            "User {} tried to delete message {} owned by {}",
            user.id,
            message.id,
            message.user_id
        );
        return Ok(found("/"));
    }

    repo.delete(message.id)?;
    tracing::info!("User {} deleted message {}", user.id, message.id);

    Ok(found(&format!("/users/{}", user.id)))
}

/// POST /messages/:id/like - Like or unlike someone else's message
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<i64>,
) -> ApiResult<Response> {
    let pool = state.db.pool.clone();

    let message = MessageRepository::new(pool.clone())
        .get_by_id(message_id)?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    if message.user_id == user.id {
        return Err(ApiError::Forbidden("You cannot like your own message".to_string()));
    }

    let liked = LikeRepository::new(pool).toggle(user.id, message.id)?;
    tracing::debug!("User {} like on message {}: {}", user.id, message.id, liked);

    Ok(found("/"))
}
