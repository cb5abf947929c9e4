use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::models::user::AuthorInfo;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "This field may not be blank."))]
    pub content: String,
    pub parent: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "This field may not be blank."))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub article: i64,
    pub user: AuthorInfo,
    pub parent: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, user: AuthorInfo) -> Self {
        Self {
            id: comment.id,
            article: comment.article_id,
            user,
            parent: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// `GET /articles/{id}/detail/comments/` returns the article with its thread.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleComments {
    pub id: i64,
    pub title: String,
    pub comments: Vec<CommentResponse>,
}
