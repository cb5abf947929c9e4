mod common;

use axum::http::StatusCode;
use common::{ids, TestApp};
use medium_blog::models::article::ArticleStatus;
use serde_json::json;

#[tokio::test]
async fn test_create_article_defaults_to_published() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let topic = app.topic().await;
    let token = app.token(&author);

    let (status, body) = app
        .post(
            "/articles/",
            &token,
            Some(json!({
                "title": "Ownership in practice",
                "summary": "Borrowing without tears",
                "content": "Long form body",
                "topic_ids": [topic.id, topic.id],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "publish");
    assert_eq!(body["author"]["id"], author.id);
    assert_eq!(body["views_count"], 0);
    assert_eq!(body["topics"].as_array().unwrap().len(), 1);
    assert_eq!(body["topics"][0]["id"], topic.id);
}

#[tokio::test]
async fn test_create_article_validation() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let topic = app.topic().await;
    let token = app.token(&author);

    let (status, body) = app
        .post(
            "/articles/",
            &token,
            Some(json!({
                "title": "Missing topic",
                "summary": "s",
                "content": "c",
                "topic_ids": [31337],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["topic_ids"][0], "Invalid pk \"31337\" - object does not exist.");

    let (status, body) = app
        .post(
            "/articles/",
            &token,
            Some(json!({
                "title": "Straight to trash",
                "summary": "s",
                "content": "c",
                "topic_ids": [topic.id],
                "status": "trash",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"][0], "\"trash\" is not a valid choice.");

    let (status, body) = app
        .post(
            "/articles/",
            &token,
            Some(json!({ "title": "", "summary": "s", "content": "c", "topic_ids": [topic.id] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["title"].is_array());

    let (status, _) = app.post("/articles/", &token, Some(json!({ "title": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_author_can_update() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let stranger = app.user().await;
    let article = app.article_with(&author, &[], ArticleStatus::Draft).await;
    let uri = format!("/articles/{}/", article.id);

    let (status, _) = app
        .patch(&uri, &app.token(&stranger), Some(json!({ "title": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .patch(
            &uri,
            &app.token(&author),
            Some(json!({ "title": "Revised", "status": "publish" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Revised");
    assert_eq!(body["status"], "publish");
}

#[tokio::test]
async fn test_delete_moves_article_to_trash() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let stranger = app.user().await;
    let article = app.article(&author, &[]).await;
    let uri = format!("/articles/{}/", article.id);

    let (status, _) = app.delete(&uri, &app.token(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&uri, &app.token(&author)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Trash);

    // 回收站里的文章不能再编辑或删除
    let (status, _) = app.get(&uri, &app.token(&author)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .patch(&uri, &app.token(&author), Some(json!({ "status": "publish" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &app.token(&author)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_shows_published_newest_first() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    let older = app.article(&author, &[]).await;
    app.article_with(&author, &[], ArticleStatus::Draft).await;
    app.article_with(&author, &[], ArticleStatus::Pending).await;
    app.article_with(&author, &[], ArticleStatus::Trash).await;
    let newer = app.article(&author, &[]).await;

    let (status, body) = app.get("/articles/", &app.token(&reader)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![newer.id, older.id]);
    assert!(body["results"][0].get("content").is_none());
}

#[tokio::test]
async fn test_list_filters_by_topic() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    let rust = app.topic().await;
    let go = app.topic().await;
    let tagged = app.article(&author, &[&rust]).await;
    let both = app.article(&author, &[&rust, &go]).await;
    app.article(&author, &[&go]).await;

    let (_, body) = app
        .get(&format!("/articles/?topic_id={}", rust.id), &app.token(&reader))
        .await;
    assert_eq!(ids(&body), vec![both.id, tagged.id]);
}

#[tokio::test]
async fn test_list_pagination() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    for _ in 0..5 {
        app.article(&author, &[]).await;
    }

    let (_, body) = app.get("/articles/?page=2&page_size=2", &app.token(&reader)).await;
    assert_eq!(body["count"], 5);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["next"], "/articles/?page=3&page_size=2");
    assert_eq!(body["previous"], "/articles/?page=1&page_size=2");
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    let in_title = app.article_titled(&author, "Zyxquark Patterns", "plain body", &[]).await;
    let in_body = app.article_titled(&author, "Unrelated", "all about ZYXQUARK here", &[]).await;
    let token = app.token(&reader);

    let (status, body) = app.get("/articles/search/?search=zyxquark", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![in_body.id, in_title.id]);

    let (_, body) = app.get("/articles/search/?search_title=ZYXQUARK", &token).await;
    assert_eq!(ids(&body), vec![in_title.id]);
}

#[tokio::test]
async fn test_search_by_topic_name() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    let topic = app.topic().await;
    let article = app.article_titled(&author, "Plain", "plain", &[&topic]).await;

    let uri = format!("/articles/search/?search={}", topic.name.replace(' ', "%20"));
    let (_, body) = app.get(&uri, &app.token(&reader)).await;
    assert_eq!(ids(&body), vec![article.id]);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new().await;
    let author = app.user().await;
    app.article(&author, &[]).await;
    let token = app.token(&author);

    let (status, body) = app.get("/articles/?page=18446744073709551615", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(body["results"].as_array().unwrap().is_empty());
    assert!(body["next"].is_null());

    let (status, body) = app
        .get("/users/favorites/?page=18446744073709551615&page_size=100", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_returns_detail() {
    let app = TestApp::new().await;
    let reader = app.user().await;
    let token = app.token(&reader);

    for uri in [
        "/articles/?topic_id=abc",
        "/articles/?page=abc",
        "/articles/search/?search=x&page_size=-1",
        "/users/favorites/?page=abc",
    ] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["detail"].is_string(), "{}", uri);
    }
}
