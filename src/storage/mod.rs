//! Persistence boundary.
//!
//! Every method is one atomic unit against the backing store. Relation
//! inserts return `None` (or `BookmarkOutcome::Duplicate`) when the unique
//! pair already exists and relation deletes return `false` when there was
//! nothing to delete, so the engines never have to read-then-write to keep
//! a uniqueness invariant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{
        article::{Article, ArticleChanges, ArticleFilter, NewArticle},
        clap::Clap,
        comment::Comment,
        faq::Faq,
        favorite::{Archive, BookmarkOutcome, Favorite, Pin},
        follow::Follow,
        notification::Notification,
        reading_history::ReadingHistory,
        recommendation::{PreferenceSignal, TopicPreference},
        report::ReportOutcome,
        topic::{NewTopic, Topic, TopicFollow},
        user::{NewUser, User},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<()>;

    // 用户
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_users(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> Result<Option<User>>;

    // 话题
    async fn insert_topic(&self, topic: NewTopic) -> Result<Topic>;
    async fn get_topic(&self, id: i64) -> Result<Option<Topic>>;
    async fn list_topics(&self) -> Result<Vec<Topic>>;

    // 文章
    async fn insert_article(&self, article: NewArticle) -> Result<Article>;
    async fn get_article(&self, id: i64) -> Result<Option<Article>>;
    async fn update_article(&self, id: i64, changes: ArticleChanges) -> Result<Option<Article>>;
    async fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>>;
    /// Bumps `views_count` and appends a reading-history row together.
    /// Returns `None` if the article is missing or in trash.
    async fn record_view(&self, article_id: i64, user_id: i64) -> Result<Option<Article>>;
    /// Returns the new `reads_count`, or `None` unless the article is published.
    async fn increment_reads(&self, article_id: i64) -> Result<Option<i64>>;
    /// `(author_id, sum(reads_count))` over published articles.
    async fn author_read_totals(&self) -> Result<Vec<(i64, i64)>>;

    // 鼓掌
    /// Adds one clap saturating at `cap`. `None` unless the article is published.
    async fn add_clap(&self, article_id: i64, user_id: i64, cap: i32) -> Result<Option<i32>>;
    async fn insert_clap(&self, article_id: i64, user_id: i64, count: i32) -> Result<Option<Clap>>;
    async fn get_clap(&self, article_id: i64, user_id: i64) -> Result<Option<Clap>>;
    async fn delete_clap(&self, article_id: i64, user_id: i64) -> Result<bool>;

    // 收藏 / 置顶 / 归档
    // 插入只对已发布文章生效，发布状态检查与插入是同一个原子单元
    async fn insert_favorite(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Favorite>>;
    async fn delete_favorite(&self, user_id: i64, article_id: i64) -> Result<bool>;
    async fn list_favorites(&self, user_id: i64) -> Result<Vec<Favorite>>;
    async fn insert_pin(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Pin>>;
    async fn delete_pin(&self, user_id: i64, article_id: i64) -> Result<bool>;
    async fn list_pins(&self, user_id: i64) -> Result<Vec<Pin>>;
    async fn insert_archive(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Archive>>;
    async fn delete_archive(&self, user_id: i64, article_id: i64) -> Result<bool>;
    async fn list_archives(&self, user_id: i64) -> Result<Vec<Archive>>;

    // 关注
    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> Result<Option<Follow>>;
    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool>;
    async fn list_followers(&self, user_id: i64) -> Result<Vec<Follow>>;
    async fn list_following(&self, user_id: i64) -> Result<Vec<Follow>>;
    async fn insert_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<Option<TopicFollow>>;
    async fn delete_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<bool>;

    // 举报
    /// Files a report and applies the threshold transition in one unit.
    async fn file_report(&self, article_id: i64, user_id: i64, threshold: i64) -> Result<ReportOutcome>;
    async fn count_reporters(&self, article_id: i64) -> Result<i64>;

    // 阅读历史
    async fn list_reading_history(&self, user_id: i64) -> Result<Vec<ReadingHistory>>;

    // 通知
    async fn insert_notification(&self, user_id: i64, message: &str) -> Result<Notification>;
    async fn get_notification(&self, id: i64) -> Result<Option<Notification>>;
    async fn list_unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>>;
    /// Sets `read_at` only if the notification belongs to `user_id` and is unread.
    async fn mark_notification_read(&self, id: i64, user_id: i64, at: DateTime<Utc>) -> Result<bool>;

    // 评论
    async fn insert_comment(
        &self,
        article_id: i64,
        user_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>>;
    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>>;
    /// Deletes the comment and its replies.
    async fn delete_comment(&self, id: i64) -> Result<bool>;
    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>>;

    // 推荐偏好
    async fn apply_preference(&self, user_id: i64, topic_ids: &[i64], signal: PreferenceSignal) -> Result<()>;
    async fn list_preferences(&self, user_id: i64) -> Result<Vec<TopicPreference>>;

    // FAQ
    async fn insert_faq(&self, question: &str, answer: &str) -> Result<Faq>;
    async fn list_faqs(&self) -> Result<Vec<Faq>>;
}
