use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::home::homepage))
        .route("/health", get(api::home::health_check))
        // Accounts
        .route("/signup", post(api::auth::signup))
        .route("/login", post(api::auth::login))
        .route("/logout", get(api::auth::logout))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users/profile", post(api::users::update_profile))
        .route("/users/delete", post(api::users::delete_user))
        .route("/users/follow/:id", post(api::users::follow_user))
        .route("/users/stop-following/:id", post(api::users::stop_following))
        .route("/users/:id", get(api::users::show_user))
        .route("/users/:id/following", get(api::users::show_following))
        .route("/users/:id/followers", get(api::users::show_followers))
        .route("/users/:id/likes", get(api::users::show_likes))
        // Messages
        .route("/messages/new", post(api::messages::create_message))
        .route("/messages/:id", get(api::messages::show_message))
        .route("/messages/:id/delete", post(api::messages::delete_message))
        .route("/messages/:id/like", post(api::messages::toggle_like))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
