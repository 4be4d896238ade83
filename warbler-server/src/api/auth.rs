use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use warbler_types::{LoginForm, SignupForm};

use super::{ApiError, ApiResult};
use crate::accounts::{is_valid_email, AccountService};
use crate::db::ModelError;
use crate::middleware::found;
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// Start a session for `user_id`, replacing whatever session the jar held
fn log_in(state: &AppState, jar: CookieJar, user_id: i64) -> ApiResult<CookieJar> {
    let jar = log_out(state, jar)?;
    let token = state.session_manager.create_session(user_id)?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

/// End the jar's session, if any, and clear the cookie
fn log_out(state: &AppState, jar: CookieJar) -> ApiResult<CookieJar> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            state.session_manager.delete_session(cookie.value())?;
            Ok(jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
        }
        None => Ok(jar),
    }
}

/// POST /signup - Create an account and log it in
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> ApiResult<Response> {
    if form.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    let email = form.email.as_deref().map(str::trim);
    match email {
        None | Some("") => {
            return Err(ApiError::BadRequest("Email address is required".to_string()));
        }
        Some(email) if !is_valid_email(email) => {
            return Err(ApiError::BadRequest("Invalid email address".to_string()));
        }
        Some(_) => {}
    }

    let accounts = AccountService::new(state.db.pool.clone());
    let user = accounts
        .register(
            form.username.as_deref(),
            email,
            form.password.as_deref(),
            form.image_url.as_deref(),
        )
        .map_err(|e| match e {
            ModelError::Integrity(_) => {
                ApiError::BadRequest("Username or email already taken".to_string())
            }
            other => other.into(),
        })?;

    let jar = log_in(&state, jar, user.id)?;
    Ok((jar, found("/")).into_response())
}

/// POST /login - Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let accounts = AccountService::new(state.db.pool.clone());
    let user = accounts
        .authenticate(&form.username, &form.password)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials.".to_string()))?;

    tracing::info!("User {} logged in", user.username);

    let jar = log_in(&state, jar, user.id)?;
    Ok((jar, found("/")).into_response())
}

/// GET /logout - End the current session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    let jar = log_out(&state, jar)?;
    Ok((jar, found("/")).into_response())
}
