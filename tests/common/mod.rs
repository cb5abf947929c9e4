#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use fake::{
    faker::{
        internet::en::SafeEmail,
        lorem::en::{Paragraph, Sentence, Word},
        name::en::{FirstName, LastName},
    },
    Fake,
};
use medium_blog::{
    build_router,
    config::Config,
    models::{
        article::{Article, ArticleStatus, NewArticle},
        clap::Clap,
        notification::Notification,
        topic::{NewTopic, Topic},
        user::{NewUser, User},
    },
    services::Database,
    state::AppState,
    storage::Store,
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

static SEQUENCE: AtomicUsize = AtomicUsize::new(1);

fn next_seq() -> usize {
    SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

/// 内存存储上的完整路由
pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let state = Arc::new(
            AppState::new(config, Database::memory())
                .await
                .expect("state should build over the memory store"),
        );
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn token(&self, user: &User) -> String {
        self.state
            .auth_service
            .issue_token(user.id, Duration::hours(1))
            .expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), body).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    // ---- factories ----

    pub async fn user(&self) -> User {
        let seq = next_seq();
        self.db()
            .insert_user(NewUser {
                username: format!("user{}", seq),
                email: SafeEmail().fake(),
                first_name: FirstName().fake(),
                last_name: LastName().fake(),
                is_active: true,
                ..Default::default()
            })
            .await
            .expect("user")
    }

    pub async fn inactive_user(&self) -> User {
        let seq = next_seq();
        self.db()
            .insert_user(NewUser {
                username: format!("inactive{}", seq),
                is_active: false,
                ..Default::default()
            })
            .await
            .expect("user")
    }

    pub async fn topic(&self) -> Topic {
        let seq = next_seq();
        let word: String = Word().fake();
        self.db()
            .insert_topic(NewTopic {
                name: format!("{} {}", word, seq),
                description: Some(Sentence(3..6).fake()),
                is_active: true,
            })
            .await
            .expect("topic")
    }

    pub async fn article(&self, author: &User, topics: &[&Topic]) -> Article {
        self.article_with(author, topics, ArticleStatus::Publish).await
    }

    pub async fn article_with(&self, author: &User, topics: &[&Topic], status: ArticleStatus) -> Article {
        self.db()
            .insert_article(NewArticle {
                author_id: author.id,
                title: Sentence(2..5).fake(),
                summary: Sentence(5..10).fake(),
                content: Paragraph(2..4).fake(),
                status,
                topic_ids: topics.iter().map(|t| t.id).collect(),
                ..Default::default()
            })
            .await
            .expect("article")
    }

    pub async fn article_titled(&self, author: &User, title: &str, content: &str, topics: &[&Topic]) -> Article {
        self.db()
            .insert_article(NewArticle {
                author_id: author.id,
                title: title.to_string(),
                summary: Sentence(5..10).fake(),
                content: content.to_string(),
                status: ArticleStatus::Publish,
                topic_ids: topics.iter().map(|t| t.id).collect(),
                ..Default::default()
            })
            .await
            .expect("article")
    }

    pub async fn article_with_counts(&self, author: &User, views: i64, reads: i64, status: ArticleStatus) -> Article {
        self.db()
            .insert_article(NewArticle {
                author_id: author.id,
                title: Sentence(2..5).fake(),
                summary: Sentence(5..10).fake(),
                content: Paragraph(2..4).fake(),
                status,
                views_count: views,
                reads_count: reads,
                ..Default::default()
            })
            .await
            .expect("article")
    }

    pub async fn clap(&self, user: &User, article: &Article, count: i32) -> Clap {
        self.db()
            .insert_clap(article.id, user.id, count)
            .await
            .expect("store")
            .expect("no clap for this pair yet")
    }

    pub async fn notification(&self, user: &User) -> Notification {
        let message: String = Sentence(3..8).fake();
        self.db()
            .insert_notification(user.id, &message)
            .await
            .expect("notification")
    }

    pub async fn article_status(&self, id: i64) -> ArticleStatus {
        self.db()
            .get_article(id)
            .await
            .expect("store")
            .expect("article exists")
            .status
    }
}

pub fn ids(results: &Value) -> Vec<i64> {
    results["results"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}
