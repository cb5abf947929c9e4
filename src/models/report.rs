use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Report {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// What happened when a report was filed, decided atomically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Article missing or not published.
    ArticleUnavailable,
    /// This user already reported this article.
    Duplicate,
    Filed { reporters: i64 },
    /// The report pushed the article past the threshold and it went to trash.
    Removed { reporters: i64 },
}
