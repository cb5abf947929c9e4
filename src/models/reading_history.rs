use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::article::ArticleListItem;

/// Append-only: one row per article detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingHistory {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingHistoryEntry {
    pub id: i64,
    pub article: ArticleListItem,
    pub created_at: DateTime<Utc>,
}
