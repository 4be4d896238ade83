use axum::{extract::State, Json};

use warbler_types::HomePage;

use super::ApiResult;
use crate::db::repositories::{LikeRepository, MessageRepository};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Messages shown on the home timeline
const TIMELINE_LIMIT: i64 = 100;

/// GET / - Timeline for logged-in users, empty landing page otherwise
pub async fn homepage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<HomePage>> {
    let Some(user) = user else {
        return Ok(Json(HomePage {
            user: None,
            messages: Vec::new(),
            liked_message_ids: Vec::new(),
        }));
    };

    let pool = state.db.pool.clone();
    let messages = MessageRepository::new(pool.clone()).timeline(user.id, TIMELINE_LIMIT)?;
    let liked_message_ids = LikeRepository::new(pool).liked_message_ids(user.id)?;

    Ok(Json(HomePage {
        user: Some(user),
        messages,
        liked_message_ids,
    }))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
