mod common;

use axum::http::StatusCode;
use common::TestApp;
use medium_blog::{models::article::ArticleStatus, storage::Store};

#[tokio::test]
async fn test_report_is_filed_once_per_user() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reporter = app.user().await;
    let article = app.article(&author, &[]).await;
    let token = app.token(&reporter);
    let uri = format!("/articles/{}/report/", article.id);

    let (status, body) = app.post(&uri, &token, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["detail"], "Report submitted.");

    let (status, body) = app.post(&uri, &token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "This article has already been reported.");

    assert_eq!(app.db().count_reporters(article.id).await.unwrap(), 1);
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Publish);
}

#[tokio::test]
async fn test_fourth_distinct_reporter_removes_article() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let article = app.article(&author, &[]).await;
    let uri = format!("/articles/{}/report/", article.id);

    for _ in 0..3 {
        let reporter = app.user().await;
        let (status, _) = app.post(&uri, &app.token(&reporter), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Publish);

    let fourth = app.user().await;
    let (status, body) = app.post(&uri, &app.token(&fourth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Article removed due to multiple reports.");
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Trash);

    // 下架后任何人都看不到
    let (status, _) = app.get(&format!("/articles/{}/", article.id), &app.token(&author)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let fifth = app.user().await;
    let (status, _) = app.post(&uri, &app.token(&fifth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 作者收到通知
    let (_, notifications) = app.get("/users/notifications/", &app.token(&author)).await;
    assert_eq!(notifications["count"], 1);
}

#[tokio::test]
async fn test_removed_article_disappears_from_listings() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reader = app.user().await;
    let article = app.article(&author, &[]).await;
    let token = app.token(&reader);

    app.get(&format!("/articles/{}/", article.id), &token).await;
    app.post(&format!("/articles/{}/favorite/", article.id), &token, None).await;

    for _ in 0..4 {
        let reporter = app.user().await;
        app.post(&format!("/articles/{}/report/", article.id), &app.token(&reporter), None)
            .await;
    }

    let (_, list) = app.get("/articles/", &token).await;
    assert_eq!(list["count"], 0);
    let (_, history) = app.get("/users/articles/history/", &token).await;
    assert_eq!(history["count"], 0);
    let (_, favorites) = app.get("/users/favorites/", &token).await;
    assert_eq!(favorites["count"], 0);
}

#[tokio::test]
async fn test_report_requires_published_article() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reporter = app.user().await;
    let draft = app.article_with(&author, &[], ArticleStatus::Draft).await;
    let token = app.token(&reporter);

    let (status, _) = app.post(&format!("/articles/{}/report/", draft.id), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/articles/424242/report/", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_threshold_comes_from_config() {
    let config = medium_blog::config::Config {
        report_threshold: 1,
        ..Default::default()
    };
    let app = TestApp::with_config(config).await;
    let author = app.user().await;
    let article = app.article(&author, &[]).await;
    let uri = format!("/articles/{}/report/", article.id);

    let (status, _) = app.post(&uri, &app.token(&app.user().await), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post(&uri, &app.token(&app.user().await), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Trash);
}

#[tokio::test]
async fn test_concurrent_reports_remove_article_once() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let article = app.article(&author, &[]).await;
    let uri = format!("/articles/{}/report/", article.id);

    let mut tokens = Vec::new();
    for _ in 0..5 {
        tokens.push(app.token(&app.user().await));
    }

    let (a, b, c, d, e) = tokio::join!(
        app.post(&uri, &tokens[0], None),
        app.post(&uri, &tokens[1], None),
        app.post(&uri, &tokens[2], None),
        app.post(&uri, &tokens[3], None),
        app.post(&uri, &tokens[4], None),
    );
    let mut statuses: Vec<u16> = [a.0, b.0, c.0, d.0, e.0].iter().map(|s| s.as_u16()).collect();
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 201, 201, 201, 404]);

    assert_eq!(app.db().count_reporters(article.id).await.unwrap(), 4);
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Trash);
}

#[tokio::test]
async fn test_concurrent_duplicate_reports_count_once() {
    let app = TestApp::new().await;
    let author = app.user().await;
    let reporter = app.user().await;
    let article = app.article(&author, &[]).await;
    let token = app.token(&reporter);
    let uri = format!("/articles/{}/report/", article.id);

    let (a, b, c) = tokio::join!(
        app.post(&uri, &token, None),
        app.post(&uri, &token, None),
        app.post(&uri, &token, None),
    );
    let created = [a.0, b.0, c.0].iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1);
    assert_eq!(app.db().count_reporters(article.id).await.unwrap(), 1);
    assert_eq!(app.article_status(article.id).await, ArticleStatus::Publish);
}
