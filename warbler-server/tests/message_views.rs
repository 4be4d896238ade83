mod common;

use axum::http::StatusCode;
use common::{assert_redirect, json_body, TestApp};
use warbler_server::db::repositories::{LikeRepository, MessageRepository};

#[tokio::test]
async fn test_messages_add_authenticated() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let cookie = app.session_cookie(&user);

    let response = app
        .post_form("/messages/new", "text=New+test+message", Some(&cookie))
        .await;
    assert_redirect(&response, &format!("/users/{}", user.id));

    let messages = MessageRepository::new(app.db.pool.clone())
        .list_by_user(user.id, 10)
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "New test message");
}

#[tokio::test]
async fn test_messages_add_unauthenticated() {
    let app = TestApp::new();

    let response = app
        .post_form("/messages/new", "text=New+test+message", None)
        .await;
    assert_redirect(&response, "/");
    assert_eq!(MessageRepository::new(app.db.pool.clone()).count().unwrap(), 0);
}

#[tokio::test]
async fn test_messages_add_with_stale_session() {
    let app = TestApp::new();

    let response = app
        .post_form("/messages/new", "text=hi", Some("warbler_session=not-a-token"))
        .await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn test_messages_add_rejects_bad_text() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let cookie = app.session_cookie(&user);

    let empty = app.post_form("/messages/new", "text=", Some(&cookie)).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let long = format!("text={}", "a".repeat(141));
    let too_long = app.post_form("/messages/new", &long, Some(&cookie)).await;
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);

    assert_eq!(MessageRepository::new(app.db.pool.clone()).count().unwrap(), 0);
}

#[tokio::test]
async fn test_messages_show() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let message = app.add_message(&user, "Test message");

    let response = app.get(&format!("/messages/{}", message.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"]["text"], "Test message");
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(body["like_count"], 0);
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_messages_show_missing() {
    let app = TestApp::new();
    let response = app.get("/messages/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_destroy_authenticated() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let message = app.add_message(&user, "Test message");
    let cookie = app.session_cookie(&user);

    let response = app
        .post_form(&format!("/messages/{}/delete", message.id), "", Some(&cookie))
        .await;
    assert_redirect(&response, &format!("/users/{}", user.id));
    assert!(MessageRepository::new(app.db.pool.clone())
        .get_by_id(message.id)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_messages_destroy_unauthenticated() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let message = app.add_message(&user, "Test message");

    let response = app
        .post_form(&format!("/messages/{}/delete", message.id), "", None)
        .await;
    assert_redirect(&response, "/");
    assert!(MessageRepository::new(app.db.pool.clone())
        .get_by_id(message.id)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_messages_destroy_by_other_user_is_refused() {
    let app = TestApp::new();
    let owner = app.add_user("owner");
    let other = app.add_user("other");
    let message = app.add_message(&owner, "Mine");
    let cookie = app.session_cookie(&other);

    let response = app
        .post_form(&format!("/messages/{}/delete", message.id), "", Some(&cookie))
        .await;
    assert_redirect(&response, "/");
    assert!(MessageRepository::new(app.db.pool.clone())
        .get_by_id(message.id)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_messages_destroy_missing() {
    let app = TestApp::new();
    let user = app.add_user("testuser");
    let cookie = app.session_cookie(&user);

    let response = app.post_form("/messages/999/delete", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggles() {
    let app = TestApp::new();
    let author = app.add_user("author");
    let fan = app.add_user("fan");
    let message = app.add_message(&author, "Like me");
    let cookie = app.session_cookie(&fan);
    let likes = LikeRepository::new(app.db.pool.clone());
    let uri = format!("/messages/{}/like", message.id);

    let response = app.post_form(&uri, "", Some(&cookie)).await;
    assert_redirect(&response, "/");
    assert!(likes.is_liked(fan.id, message.id).unwrap());

    let response = app.post_form(&uri, "", Some(&cookie)).await;
    assert_redirect(&response, "/");
    assert!(!likes.is_liked(fan.id, message.id).unwrap());
}

#[tokio::test]
async fn test_cannot_like_own_message() {
    let app = TestApp::new();
    let author = app.add_user("author");
    let message = app.add_message(&author, "Self love");
    let cookie = app.session_cookie(&author);

    let response = app
        .post_form(&format!("/messages/{}/like", message.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        LikeRepository::new(app.db.pool.clone())
            .count_for_message(message.id)
            .unwrap(),
        0
    );
}
