use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use warbler_types::User;

use crate::db::repositories::UserRepository;
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// The user behind the request's session cookie, if any.
///
/// Inserted into the request extensions by [`session_middleware`] on every request.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<User>);

/// Resolve the session cookie to a user and attach it to the request
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let current_user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match load_user_from_token(&state, cookie.value()) {
            Ok(user) => CurrentUser(user),
            Err(e) => {
                // Treat a failed lookup as anonymous rather than failing the request
                tracing::warn!("Failed to resolve session: {:#}", e);
                CurrentUser(None)
            }
        },
        None => CurrentUser(None),
    };

    request.extensions_mut().insert(current_user);
    next.run(request).await
}

fn load_user_from_token(state: &AppState, token: &str) -> anyhow::Result<Option<User>> {
    let Some(user_id) = state.session_manager.validate_session(token)? else {
        return Ok(None);
    };
    UserRepository::new(state.db.pool.clone()).get_by_id(user_id)
}

/// A 302 Found pointing at `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Extractor for handlers that need a logged-in user.
///
/// Anonymous requests are turned away with a 302 to `/` before the handler runs.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(CurrentUser(Some(user))) => Ok(AuthUser(user.clone())),
            _ => {
                tracing::debug!("Unauthorized access to {}", parts.uri.path());
                Err(found("/"))
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn test_user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@test.com".to_string(),
            password: String::new(),
            image_url: warbler_types::DEFAULT_IMAGE_URL.to_string(),
            header_image_url: None,
            bio: None,
            location: None,
            join_date: chrono::Utc::now(),
        }
    }

    fn parts_with(current: Option<CurrentUser>) -> Parts {
        let mut request = HttpRequest::builder().uri("/messages/new").body(()).unwrap();
        if let Some(current) = current {
            request.extensions_mut().insert(current);
        }
        request.into_parts().0
    }

    #[test]
    fn test_found_redirect() {
        let response = found("/users/7");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/users/7");
    }

    #[tokio::test]
    async fn test_auth_user_extracted_when_logged_in() {
        let mut parts = parts_with(Some(CurrentUser(Some(test_user()))));
        let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, 42);
    }

    #[tokio::test]
    async fn test_auth_user_rejects_anonymous_with_redirect() {
        for current in [None, Some(CurrentUser(None))] {
            let mut parts = parts_with(current);
            let rejection = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
            assert_eq!(rejection.status(), StatusCode::FOUND);
            assert_eq!(rejection.headers()[header::LOCATION], "/");
        }
    }
}
