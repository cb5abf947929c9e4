use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::article::ArticleListItem;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pin {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Archive {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

/// 收藏 / 置顶 / 归档的插入结果；发布状态和唯一性在同一次存储调用里判定
#[derive(Debug, Clone)]
pub enum BookmarkOutcome<T> {
    Created(T),
    Duplicate,
    /// 文章不存在或未发布
    ArticleUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteWithArticle {
    pub id: i64,
    pub article: ArticleListItem,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveWithArticle {
    pub id: i64,
    pub article: ArticleListItem,
    pub created_at: DateTime<Utc>,
}
