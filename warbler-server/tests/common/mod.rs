#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use warbler_server::{
    app::build_router,
    db::{
        repositories::{MessageRepository, NewUser, UserRepository},
        Database,
    },
    session::SESSION_COOKIE,
    state::AppState,
};
use warbler_types::{Message, User, DEFAULT_IMAGE_URL};

/// A router over a fresh in-memory database
pub struct TestApp {
    pub db: Database,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let state = AppState::new(db.clone(), 30);
        let router = build_router(state.clone());
        Self { db, state, router }
    }

    /// Insert a user directly, skipping password hashing
    pub fn add_user(&self, username: &str) -> User {
        UserRepository::new(self.db.pool.clone())
            .insert(&NewUser {
                username: Some(username.to_string()),
                email: Some(format!("{username}@test.com")),
                password: "HASHED_PASSWORD".to_string(),
                image_url: DEFAULT_IMAGE_URL.to_string(),
            })
            .expect("Failed to insert user")
    }

    pub fn add_message(&self, user: &User, text: &str) -> Message {
        MessageRepository::new(self.db.pool.clone())
            .create(user.id, text)
            .expect("Failed to create message")
    }

    /// `Cookie` header value carrying a fresh session for `user`
    pub fn session_cookie(&self, user: &User) -> String {
        let token = self
            .state
            .session_manager
            .create_session(user.id)
            .expect("Failed to create session");
        format!("{SESSION_COOKIE}={token}")
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap()).await
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
}

pub fn assert_redirect(response: &Response, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(response), expected);
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// `name=value` of the session cookie a response sets
pub fn set_session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}
