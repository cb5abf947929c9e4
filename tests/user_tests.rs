mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use medium_blog::storage::Store;
use serde_json::json;

#[tokio::test]
async fn test_profile_roundtrip() {
    let app = TestApp::new().await;
    let user = app.user().await;
    let token = app.token(&user);

    let (status, body) = app.get("/users/me/", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id);
    assert_eq!(body["username"], user.username.as_str());

    let (status, body) = app
        .patch(
            "/users/me/",
            &token,
            Some(json!({ "first_name": "Ada", "birth_year": 1990, "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["birth_year"], 1990);
    assert_eq!(body["email"], "ada@example.com");

    let (_, body) = app.patch("/users/me/", &token, Some(json!({ "email": "" }))).await;
    assert_eq!(body["email"], "");
}

#[tokio::test]
async fn test_profile_validation() {
    let app = TestApp::new().await;
    let user = app.user().await;
    let token = app.token(&user);

    let (status, body) = app
        .patch("/users/me/", &token, Some(json!({ "email": "not-an-email" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"][0], "Enter a valid email address.");

    let (status, body) = app
        .patch("/users/me/", &token, Some(json!({ "birth_year": 1850 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["birth_year"][0], "Birth year must be between 1900 and 2025.");
}

#[tokio::test]
async fn test_inactive_user_token_is_rejected() {
    let app = TestApp::new().await;
    let inactive = app.inactive_user().await;

    let (status, _) = app.get("/users/me/", &app.token(&inactive)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notifications_mark_read() {
    let app = TestApp::new().await;
    let user = app.user().await;
    let other = app.user().await;
    let older = app.notification(&user).await;
    let newer = app.notification(&user).await;
    let foreign = app.notification(&other).await;
    let token = app.token(&user);

    let (status, body) = app.get("/users/notifications/", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["id"], newer.id);
    assert_eq!(body["results"][1]["id"], older.id);

    let (status, body) = app.get(&format!("/users/notifications/{}/", older.id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], older.message.as_str());

    let (status, _) = app
        .patch(&format!("/users/notifications/{}/", older.id), &token, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // 已读通知不再可见
    let (status, _) = app.get(&format!("/users/notifications/{}/", older.id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .patch(&format!("/users/notifications/{}/", older.id), &token, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/users/notifications/{}/", foreign.id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/users/notifications/", &token).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_public_topics_and_faqs() {
    let app = TestApp::new().await;
    app.topic().await;
    app.topic().await;
    app.db()
        .insert_faq("How do claps work?", "Up to fifty per reader.")
        .await
        .unwrap();

    let (status, body) = app.request(Method::GET, "/articles/topics/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = app.request(Method::GET, "/articles/faqs/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["question"], "How do claps work?");
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Healthy");
}
