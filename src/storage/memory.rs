use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

use super::Store;
use crate::{
    error::Result,
    models::{
        article::{Article, ArticleChanges, ArticleFilter, ArticleStatus, NewArticle},
        clap::Clap,
        comment::Comment,
        faq::Faq,
        favorite::{Archive, BookmarkOutcome, Favorite, Pin},
        follow::Follow,
        notification::Notification,
        reading_history::ReadingHistory,
        recommendation::{PreferenceSignal, TopicPreference},
        report::{Report, ReportOutcome},
        topic::{NewTopic, Topic, TopicFollow},
        user::{NewUser, User},
    },
};

#[derive(Debug, Clone)]
struct ArticleRow {
    id: i64,
    author_id: i64,
    title: String,
    summary: String,
    content: String,
    thumbnail: Option<String>,
    status: ArticleStatus,
    views_count: i64,
    reads_count: i64,
    topic_ids: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    topics: BTreeMap<i64, Topic>,
    articles: BTreeMap<i64, ArticleRow>,
    claps: Vec<Clap>,
    favorites: Vec<Favorite>,
    pins: Vec<Pin>,
    archives: Vec<Archive>,
    follows: Vec<Follow>,
    topic_follows: Vec<TopicFollow>,
    reports: Vec<Report>,
    reading_history: Vec<ReadingHistory>,
    notifications: BTreeMap<i64, Notification>,
    comments: BTreeMap<i64, Comment>,
    preferences: BTreeMap<(i64, i64), TopicPreference>,
    faqs: Vec<Faq>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn hydrate(&self, row: &ArticleRow) -> Article {
        let topics = row
            .topic_ids
            .iter()
            .filter_map(|id| self.topics.get(id).cloned())
            .collect();

        Article {
            id: row.id,
            author_id: row.author_id,
            title: row.title.clone(),
            summary: row.summary.clone(),
            content: row.content.clone(),
            thumbnail: row.thumbnail.clone(),
            status: row.status,
            views_count: row.views_count,
            reads_count: row.reads_count,
            topics,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn article_status(&self, article_id: i64) -> Option<ArticleStatus> {
        self.articles.get(&article_id).map(|row| row.status)
    }

    fn is_published(&self, article_id: i64) -> bool {
        matches!(self.article_status(article_id), Some(ArticleStatus::Publish))
    }
}

/// 进程内存储
///
/// 所有表共用一把锁，每个方法在整个执行期间持有它，
/// 因此并发请求在这里天然串行化。
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Creating in-memory store");
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        let _tables = self.tables.lock();
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.lock();
        let id = t.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            middle_name: user.middle_name,
            birth_year: user.birth_year,
            avatar: user.avatar,
            is_active: user.is_active,
            date_joined: Utc::now(),
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn get_users(&self, ids: &[i64]) -> Result<Vec<User>> {
        let t = self.tables.lock();
        Ok(ids.iter().filter_map(|id| t.users.get(id).cloned()).collect())
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>> {
        let mut t = self.tables.lock();
        match t.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn insert_topic(&self, topic: NewTopic) -> Result<Topic> {
        let mut t = self.tables.lock();
        let id = t.next_id();
        let topic = Topic {
            id,
            name: topic.name,
            description: topic.description,
            is_active: topic.is_active,
        };
        t.topics.insert(id, topic.clone());
        Ok(topic)
    }

    async fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        Ok(self.tables.lock().topics.get(&id).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        Ok(self.tables.lock().topics.values().cloned().collect())
    }

    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let mut t = self.tables.lock();
        let id = t.next_id();
        let now = Utc::now();
        let row = ArticleRow {
            id,
            author_id: article.author_id,
            title: article.title,
            summary: article.summary,
            content: article.content,
            thumbnail: article.thumbnail,
            status: article.status,
            views_count: article.views_count,
            reads_count: article.reads_count,
            topic_ids: article.topic_ids,
            created_at: now,
            updated_at: now,
        };
        let article = t.hydrate(&row);
        t.articles.insert(id, row);
        Ok(article)
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let t = self.tables.lock();
        Ok(t.articles.get(&id).map(|row| t.hydrate(row)))
    }

    async fn update_article(&self, id: i64, changes: ArticleChanges) -> Result<Option<Article>> {
        let mut guard = self.tables.lock();
        let t = &mut *guard;
        let row = match t.articles.get_mut(&id) {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(summary) = changes.summary {
            row.summary = summary;
        }
        if let Some(content) = changes.content {
            row.content = content;
        }
        if let Some(thumbnail) = changes.thumbnail {
            row.thumbnail = Some(thumbnail);
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        if let Some(topic_ids) = changes.topic_ids {
            row.topic_ids = topic_ids;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(Some(t.hydrate(&row)))
    }

    async fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let t = self.tables.lock();
        Ok(t.articles
            .values()
            .map(|row| t.hydrate(row))
            .filter(|article| filter.matches(article))
            .collect())
    }

    async fn record_view(&self, article_id: i64, user_id: i64) -> Result<Option<Article>> {
        let mut guard = self.tables.lock();
        let t = &mut *guard;
        match t.article_status(article_id) {
            Some(status) if !status.is_terminal() => {}
            _ => return Ok(None),
        }

        let now = Utc::now();
        let id = t.next_id();
        t.reading_history.push(ReadingHistory {
            id,
            user_id,
            article_id,
            created_at: now,
        });

        let row = match t.articles.get_mut(&article_id) {
            Some(row) => {
                row.views_count += 1;
                row.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(t.hydrate(&row)))
    }

    async fn increment_reads(&self, article_id: i64) -> Result<Option<i64>> {
        let mut t = self.tables.lock();
        match t.articles.get_mut(&article_id) {
            Some(row) if row.status.is_published() => {
                row.reads_count += 1;
                Ok(Some(row.reads_count))
            }
            _ => Ok(None),
        }
    }

    async fn author_read_totals(&self) -> Result<Vec<(i64, i64)>> {
        let t = self.tables.lock();
        let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
        for row in t.articles.values().filter(|row| row.status.is_published()) {
            *totals.entry(row.author_id).or_insert(0) += row.reads_count;
        }
        Ok(totals.into_iter().collect())
    }

    async fn add_clap(&self, article_id: i64, user_id: i64, cap: i32) -> Result<Option<i32>> {
        let mut guard = self.tables.lock();
        let t = &mut *guard;
        if !t.is_published(article_id) {
            return Ok(None);
        }

        let now = Utc::now();
        if let Some(clap) = t
            .claps
            .iter_mut()
            .find(|c| c.article_id == article_id && c.user_id == user_id)
        {
            clap.count = Clap::next_count(Some(clap.count), cap);
            clap.updated_at = now;
            return Ok(Some(clap.count));
        }

        let id = t.next_id();
        let count = Clap::next_count(None, cap);
        t.claps.push(Clap {
            id,
            article_id,
            user_id,
            count,
            created_at: now,
            updated_at: now,
        });
        Ok(Some(count))
    }

    async fn insert_clap(&self, article_id: i64, user_id: i64, count: i32) -> Result<Option<Clap>> {
        let mut t = self.tables.lock();
        if t.claps.iter().any(|c| c.article_id == article_id && c.user_id == user_id) {
            return Ok(None);
        }
        let now = Utc::now();
        let clap = Clap {
            id: t.next_id(),
            article_id,
            user_id,
            count,
            created_at: now,
            updated_at: now,
        };
        t.claps.push(clap.clone());
        Ok(Some(clap))
    }

    async fn get_clap(&self, article_id: i64, user_id: i64) -> Result<Option<Clap>> {
        let t = self.tables.lock();
        Ok(t.claps
            .iter()
            .find(|c| c.article_id == article_id && c.user_id == user_id)
            .cloned())
    }

    async fn delete_clap(&self, article_id: i64, user_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.claps.len();
        t.claps.retain(|c| !(c.article_id == article_id && c.user_id == user_id));
        Ok(t.claps.len() != before)
    }

    async fn insert_favorite(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Favorite>> {
        let mut t = self.tables.lock();
        if !t.is_published(article_id) {
            return Ok(BookmarkOutcome::ArticleUnavailable);
        }
        if t.favorites.iter().any(|f| f.user_id == user_id && f.article_id == article_id) {
            return Ok(BookmarkOutcome::Duplicate);
        }
        let favorite = Favorite {
            id: t.next_id(),
            user_id,
            article_id,
            created_at: Utc::now(),
        };
        t.favorites.push(favorite.clone());
        Ok(BookmarkOutcome::Created(favorite))
    }

    async fn delete_favorite(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.favorites.len();
        t.favorites.retain(|f| !(f.user_id == user_id && f.article_id == article_id));
        Ok(t.favorites.len() != before)
    }

    async fn list_favorites(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let t = self.tables.lock();
        Ok(t.favorites.iter().filter(|f| f.user_id == user_id).cloned().collect())
    }

    async fn insert_pin(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Pin>> {
        let mut t = self.tables.lock();
        if !t.is_published(article_id) {
            return Ok(BookmarkOutcome::ArticleUnavailable);
        }
        if t.pins.iter().any(|p| p.user_id == user_id && p.article_id == article_id) {
            return Ok(BookmarkOutcome::Duplicate);
        }
        let pin = Pin {
            id: t.next_id(),
            user_id,
            article_id,
            created_at: Utc::now(),
        };
        t.pins.push(pin.clone());
        Ok(BookmarkOutcome::Created(pin))
    }

    async fn delete_pin(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.pins.len();
        t.pins.retain(|p| !(p.user_id == user_id && p.article_id == article_id));
        Ok(t.pins.len() != before)
    }

    async fn list_pins(&self, user_id: i64) -> Result<Vec<Pin>> {
        let t = self.tables.lock();
        Ok(t.pins.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn insert_archive(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Archive>> {
        let mut t = self.tables.lock();
        if !t.is_published(article_id) {
            return Ok(BookmarkOutcome::ArticleUnavailable);
        }
        if t.archives.iter().any(|a| a.user_id == user_id && a.article_id == article_id) {
            return Ok(BookmarkOutcome::Duplicate);
        }
        let archive = Archive {
            id: t.next_id(),
            user_id,
            article_id,
            created_at: Utc::now(),
        };
        t.archives.push(archive.clone());
        Ok(BookmarkOutcome::Created(archive))
    }

    async fn delete_archive(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.archives.len();
        t.archives.retain(|a| !(a.user_id == user_id && a.article_id == article_id));
        Ok(t.archives.len() != before)
    }

    async fn list_archives(&self, user_id: i64) -> Result<Vec<Archive>> {
        let t = self.tables.lock();
        Ok(t.archives.iter().filter(|a| a.user_id == user_id).cloned().collect())
    }

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> Result<Option<Follow>> {
        let mut t = self.tables.lock();
        if t.follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followee_id == followee_id)
        {
            return Ok(None);
        }
        let follow = Follow {
            id: t.next_id(),
            follower_id,
            followee_id,
            created_at: Utc::now(),
        };
        t.follows.push(follow.clone());
        Ok(Some(follow))
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.follows.len();
        t.follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(t.follows.len() != before)
    }

    async fn list_followers(&self, user_id: i64) -> Result<Vec<Follow>> {
        let t = self.tables.lock();
        Ok(t.follows.iter().filter(|f| f.followee_id == user_id).cloned().collect())
    }

    async fn list_following(&self, user_id: i64) -> Result<Vec<Follow>> {
        let t = self.tables.lock();
        Ok(t.follows.iter().filter(|f| f.follower_id == user_id).cloned().collect())
    }

    async fn insert_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<Option<TopicFollow>> {
        let mut t = self.tables.lock();
        if t.topic_follows
            .iter()
            .any(|f| f.user_id == user_id && f.topic_id == topic_id)
        {
            return Ok(None);
        }
        let follow = TopicFollow {
            id: t.next_id(),
            user_id,
            topic_id,
            created_at: Utc::now(),
        };
        t.topic_follows.push(follow.clone());
        Ok(Some(follow))
    }

    async fn delete_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        let before = t.topic_follows.len();
        t.topic_follows
            .retain(|f| !(f.user_id == user_id && f.topic_id == topic_id));
        Ok(t.topic_follows.len() != before)
    }

    async fn file_report(&self, article_id: i64, user_id: i64, threshold: i64) -> Result<ReportOutcome> {
        let mut guard = self.tables.lock();
        let t = &mut *guard;
        let status = match t.article_status(article_id) {
            Some(status) if status.is_published() => status,
            _ => return Ok(ReportOutcome::ArticleUnavailable),
        };

        if t.reports
            .iter()
            .any(|r| r.article_id == article_id && r.user_id == user_id)
        {
            return Ok(ReportOutcome::Duplicate);
        }

        let now = Utc::now();
        let id = t.next_id();
        t.reports.push(Report {
            id,
            article_id,
            user_id,
            created_at: now,
        });

        // (article, user) 唯一，行数即不同举报人数
        let reporters = t.reports.iter().filter(|r| r.article_id == article_id).count() as i64;
        let next = status.after_report(reporters, threshold);
        if next == status {
            return Ok(ReportOutcome::Filed { reporters });
        }

        if let Some(row) = t.articles.get_mut(&article_id) {
            row.status = next;
            row.updated_at = now;
        }
        Ok(ReportOutcome::Removed { reporters })
    }

    async fn count_reporters(&self, article_id: i64) -> Result<i64> {
        let t = self.tables.lock();
        Ok(t.reports.iter().filter(|r| r.article_id == article_id).count() as i64)
    }

    async fn list_reading_history(&self, user_id: i64) -> Result<Vec<ReadingHistory>> {
        let t = self.tables.lock();
        Ok(t.reading_history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, user_id: i64, message: &str) -> Result<Notification> {
        let mut t = self.tables.lock();
        let id = t.next_id();
        let notification = Notification {
            id,
            user_id,
            message: message.to_string(),
            read_at: None,
            created_at: Utc::now(),
        };
        t.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn get_notification(&self, id: i64) -> Result<Option<Notification>> {
        Ok(self.tables.lock().notifications.get(&id).cloned())
    }

    async fn list_unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        let t = self.tables.lock();
        Ok(t.notifications
            .values()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut t = self.tables.lock();
        match t.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id && n.is_unread() => {
                n.read_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_comment(
        &self,
        article_id: i64,
        user_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment> {
        let mut t = self.tables.lock();
        let id = t.next_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            article_id,
            user_id,
            parent_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.tables.lock().comments.get(&id).cloned())
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let mut t = self.tables.lock();
        Ok(t.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.lock();
        if !t.comments.contains_key(&id) {
            return Ok(false);
        }

        // 连同所有回复一起删除
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            t.comments.remove(&current);
            pending.extend(
                t.comments
                    .values()
                    .filter(|c| c.parent_id == Some(current))
                    .map(|c| c.id),
            );
        }
        Ok(true)
    }

    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>> {
        let t = self.tables.lock();
        Ok(t.comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn apply_preference(&self, user_id: i64, topic_ids: &[i64], signal: PreferenceSignal) -> Result<()> {
        let mut t = self.tables.lock();
        let now = Utc::now();
        for &topic_id in topic_ids {
            let preference = t
                .preferences
                .entry((user_id, topic_id))
                .or_insert_with(|| TopicPreference {
                    user_id,
                    topic_id,
                    weight: 0,
                    updated_at: now,
                });
            preference.weight = signal.apply(preference.weight);
            preference.updated_at = now;
        }
        Ok(())
    }

    async fn list_preferences(&self, user_id: i64) -> Result<Vec<TopicPreference>> {
        let t = self.tables.lock();
        Ok(t.preferences
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn insert_faq(&self, question: &str, answer: &str) -> Result<Faq> {
        let mut t = self.tables.lock();
        let faq = Faq {
            id: t.next_id(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };
        t.faqs.push(faq.clone());
        Ok(faq)
    }

    async fn list_faqs(&self) -> Result<Vec<Faq>> {
        Ok(self.tables.lock().faqs.clone())
    }
}
