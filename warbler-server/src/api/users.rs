use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use warbler_types::{
    LikedMessages, ProfileForm, User, UserList, UserProfile, UserSearchQuery,
};

use super::{ApiError, ApiResult};
use crate::accounts::{is_valid_email, AccountService};
use crate::db::repositories::{
    FollowRepository, LikeRepository, MessageRepository, ProfileUpdate, UserRepository,
};
use crate::db::ModelError;
use crate::middleware::{found, AuthUser};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// Messages shown on a profile page
const PROFILE_MESSAGE_LIMIT: i64 = 100;

fn load_user(state: &AppState, user_id: i64) -> ApiResult<User> {
    UserRepository::new(state.db.pool.clone())
        .get_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Blank form fields mean "leave unchanged"
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /users?q= - List users, optionally filtered by username
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = UserRepository::new(state.db.pool.clone()).search(query.q.as_deref())?;
    Ok(Json(users))
}

/// GET /users/:id - Profile with counts and recent messages
pub async fn show_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let user = load_user(&state, user_id)?;

    let pool = state.db.pool.clone();
    let messages_repo = MessageRepository::new(pool.clone());
    let follow_repo = FollowRepository::new(pool.clone());
    let like_repo = LikeRepository::new(pool);

    Ok(Json(UserProfile {
        message_count: messages_repo.count_by_user(user.id)?,
        following_count: follow_repo.following_count(user.id)?,
        follower_count: follow_repo.follower_count(user.id)?,
        like_count: like_repo.count_by_user(user.id)?,
        messages: messages_repo.list_by_user(user.id, PROFILE_MESSAGE_LIMIT)?,
        user,
    }))
}

/// GET /users/:id/following - Who this user follows
pub async fn show_following(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserList>> {
    let user = load_user(&state, user_id)?;
    let users = FollowRepository::new(state.db.pool.clone()).following(user.id)?;
    Ok(Json(UserList { user, users }))
}

/// GET /users/:id/followers - Who follows this user
pub async fn show_followers(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserList>> {
    let user = load_user(&state, user_id)?;
    let users = FollowRepository::new(state.db.pool.clone()).followers(user.id)?;
    Ok(Json(UserList { user, users }))
}

/// GET /users/:id/likes - Messages this user liked
pub async fn show_likes(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<LikedMessages>> {
    let user = load_user(&state, user_id)?;
    let messages = LikeRepository::new(state.db.pool.clone()).liked_messages(user.id)?;
    Ok(Json(LikedMessages { user, messages }))
}

/// POST /users/follow/:id - Follow another user
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(follow_id): Path<i64>,
) -> ApiResult<Response> {
    if follow_id == user.id {
        return Err(ApiError::BadRequest("You cannot follow yourself".to_string()));
    }
    let followed = load_user(&state, follow_id)?;

    FollowRepository::new(state.db.pool.clone()).follow(user.id, followed.id)?;
    tracing::info!("User {} followed {}", user.id, followed.id);

    Ok(found(&format!("/users/{}/following", user.id)))
}

/// POST /users/stop-following/:id - Stop following a user
pub async fn stop_following(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(follow_id): Path<i64>,
) -> ApiResult<Response> {
    let removed = FollowRepository::new(state.db.pool.clone()).unfollow(user.id, follow_id)?;
    if removed > 0 {
        tracing::info!("User {} unfollowed {}", user.id, follow_id);
    }

    Ok(found(&format!("/users/{}/following", user.id)))
}

/// POST /users/profile - Edit the current user's profile
///
/// The form must carry the user's current password.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<ProfileForm>,
) -> ApiResult<Response> {
    let accounts = AccountService::new(state.db.pool.clone());
    if accounts.authenticate(&user.username, &form.password)?.is_none() {
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let update = ProfileUpdate {
        username: non_blank(form.username),
        email: non_blank(form.email),
        image_url: non_blank(form.image_url),
        header_image_url: non_blank(form.header_image_url),
        bio: non_blank(form.bio),
        location: non_blank(form.location),
    };

    if let Some(email) = update.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("Invalid email address".to_string()));
        }
    }

    UserRepository::new(state.db.pool.clone())
        .update_profile(user.id, &update)
        .map_err(|e| match e {
            ModelError::Integrity(_) => {
                ApiError::BadRequest("Username or email already taken".to_string())
            }
            other => other.into(),
        })?;
    tracing::info!("User {} updated their profile", user.id);

    Ok(found(&format!("/users/{}", user.id)))
}

/// POST /users/delete - Delete the current user and everything they own
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> ApiResult<Response> {
    // Sessions go with the user row
    UserRepository::new(state.db.pool.clone()).delete(user.id)?;
    tracing::info!("Deleted user {} ({})", user.username, user.id);

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, found("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("".to_string())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" bio ".to_string())), Some("bio".to_string()));
    }
}
