use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;
use validator::Validate;

use crate::models::{topic::Topic, user::AuthorInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ArticleStatus,
    pub views_count: i64,
    pub reads_count: i64,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 文章状态
///
/// `Trash` 是终态：举报阈值触发或作者删除之后，文章不再对任何接口可见。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Pending,
    Publish,
    Trash,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Draft
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusTransitionError {
    #[error("article is in trash and can no longer change status")]
    Terminal,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Publish => "publish",
            Self::Trash => "trash",
        }
    }

    pub fn is_published(&self) -> bool {
        *self == Self::Publish
    }

    pub fn is_terminal(&self) -> bool {
        *self == Self::Trash
    }

    /// Explicit status change requested by the author (edit or delete).
    pub fn transition(self, target: ArticleStatus) -> Result<ArticleStatus, StatusTransitionError> {
        if self.is_terminal() {
            return Err(StatusTransitionError::Terminal);
        }
        Ok(target)
    }

    /// Status after a report has been recorded. Only a published article
    /// whose distinct reporter count strictly exceeds the threshold moves
    /// to trash.
    pub fn after_report(self, reporters: i64, threshold: i64) -> ArticleStatus {
        match self {
            Self::Publish if reporters > threshold => Self::Trash,
            other => other,
        }
    }
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }

    /// Author may still see drafts and pending articles; everyone else only
    /// sees published ones.
    pub fn is_visible_to(&self, user_id: i64) -> bool {
        match self.status {
            ArticleStatus::Publish => true,
            ArticleStatus::Trash => false,
            _ => self.author_id == user_id,
        }
    }

    pub fn has_topic(&self, topic_id: i64) -> bool {
        self.topics.iter().any(|t| t.id == topic_id)
    }

    /// Case-insensitive substring match over title, summary, content and topic names.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.summary.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.topics.iter().any(|t| t.name.to_lowercase().contains(&needle))
    }

    pub fn matches_title(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(&needle.to_lowercase())
    }

    /// 默认排序：创建时间倒序，同一时刻按 id 倒序
    pub fn newest_first(a: &Article, b: &Article) -> Ordering {
        b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
    }
}

/// Insert payload handed to the store.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub author_id: i64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ArticleStatus,
    pub topic_ids: Vec<i64>,
    pub views_count: i64,
    pub reads_count: i64,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    pub status: Option<ArticleStatus>,
    pub topic_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub statuses: Vec<ArticleStatus>,
    pub author_id: Option<i64>,
    pub topic_id: Option<i64>,
    pub ids: Option<Vec<i64>>,
}

impl ArticleFilter {
    pub fn published() -> Self {
        Self {
            statuses: vec![ArticleStatus::Publish],
            ..Default::default()
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&article.status) {
            return false;
        }
        if let Some(author_id) = self.author_id {
            if article.author_id != author_id {
                return false;
            }
        }
        if let Some(topic_id) = self.topic_id {
            if !article.has_topic(topic_id) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&article.id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub title: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub summary: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub content: String,

    #[validate(length(max = 255))]
    pub thumbnail: Option<String>,

    #[validate(length(min = 1, message = "This list may not be empty."))]
    pub topic_ids: Vec<i64>,

    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub summary: Option<String>,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub content: Option<String>,

    #[validate(length(max = 255))]
    pub thumbnail: Option<String>,

    #[validate(length(min = 1, message = "This list may not be empty."))]
    pub topic_ids: Option<Vec<i64>>,

    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub author: AuthorInfo,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ArticleStatus,
    pub views_count: i64,
    pub reads_count: i64,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleResponse {
    pub fn new(article: Article, author: AuthorInfo) -> Self {
        Self {
            id: article.id,
            author,
            title: article.title,
            summary: article.summary,
            content: article.content,
            thumbnail: article.thumbnail,
            status: article.status,
            views_count: article.views_count,
            reads_count: article.reads_count,
            topics: article.topics,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleListItem {
    pub id: i64,
    pub author: AuthorInfo,
    pub title: String,
    pub summary: String,
    pub thumbnail: Option<String>,
    pub status: ArticleStatus,
    pub views_count: i64,
    pub reads_count: i64,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
}

impl ArticleListItem {
    pub fn new(article: Article, author: AuthorInfo) -> Self {
        Self {
            id: article.id,
            author,
            title: article.title,
            summary: article.summary,
            thumbnail: article.thumbnail,
            status: article.status,
            views_count: article.views_count,
            reads_count: article.reads_count,
            topics: article.topics,
            created_at: article.created_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArticleListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub topic_id: Option<i64>,
    pub is_recommend: Option<bool>,
    /// Kept as text so a non-numeric value can be reported as a field error.
    pub get_top_articles: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub search_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_threshold_transition() {
        let status = ArticleStatus::Publish;
        assert_eq!(status.after_report(1, 3), ArticleStatus::Publish);
        assert_eq!(status.after_report(3, 3), ArticleStatus::Publish);
        assert_eq!(status.after_report(4, 3), ArticleStatus::Trash);
    }

    #[test]
    fn test_only_published_articles_are_removed_by_reports() {
        assert_eq!(ArticleStatus::Draft.after_report(10, 3), ArticleStatus::Draft);
        assert_eq!(ArticleStatus::Trash.after_report(10, 3), ArticleStatus::Trash);
    }

    #[test]
    fn test_trash_is_terminal() {
        assert_eq!(
            ArticleStatus::Trash.transition(ArticleStatus::Publish),
            Err(StatusTransitionError::Terminal)
        );
        assert_eq!(
            ArticleStatus::Draft.transition(ArticleStatus::Publish),
            Ok(ArticleStatus::Publish)
        );
        assert_eq!(
            ArticleStatus::Publish.transition(ArticleStatus::Trash),
            Ok(ArticleStatus::Trash)
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ArticleStatus::Publish).unwrap();
        assert_eq!(json, "\"publish\"");
        let parsed: ArticleStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(parsed, ArticleStatus::Pending);
    }
}
