use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    FromRow, PgPool, Postgres, QueryBuilder,
};
use std::collections::HashMap;
use tracing::{debug, info};

use super::Store;
use crate::{
    config::Config,
    error::{AppError, Result},
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
        report::ReportOutcome,
        topic::{NewTopic, Topic, TopicFollow},
        user::{NewUser, User},
    },
};

#[derive(Debug, FromRow)]
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
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ArticleRow {
    fn into_article(self, topics: Vec<Topic>) -> Article {
        Article {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            summary: self.summary,
            content: self.content,
            thumbnail: self.thumbnail,
            status: self.status,
            views_count: self.views_count,
            reads_count: self.reads_count,
            topics,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ArticleTopicRow {
    article_id: i64,
    id: i64,
    name: String,
    description: Option<String>,
    is_active: bool,
}

/// PostgreSQL 存储
///
/// 唯一性由表上的 UNIQUE 约束保证；需要多条语句的操作在事务里
/// 先对文章行加 `FOR UPDATE` 锁。
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &Config) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL (max {} connections)",
            config.database_max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        Ok(Self { pool })
    }

    async fn attach_topics(&self, rows: Vec<ArticleRow>) -> Result<Vec<Article>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let links: Vec<ArticleTopicRow> = sqlx::query_as(
            r#"
            SELECT at.article_id, t.id, t.name, t.description, t.is_active
            FROM article_topics at
            JOIN topics t ON t.id = at.topic_id
            WHERE at.article_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_article: HashMap<i64, Vec<Topic>> = HashMap::new();
        for link in links {
            by_article.entry(link.article_id).or_default().push(Topic {
                id: link.id,
                name: link.name,
                description: link.description,
                is_active: link.is_active,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let topics = by_article.remove(&row.id).unwrap_or_default();
                row.into_article(topics)
            })
            .collect())
    }

    async fn attach_one(&self, row: Option<ArticleRow>) -> Result<Option<Article>> {
        match row {
            Some(row) => Ok(self.attach_topics(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// favorites / pins / archives 共用：共享锁住文章行再插入，
    /// 与 `file_report` 的 FOR UPDATE 互斥，文章不会在检查和插入之间进回收站
    async fn insert_bookmark<T>(
        &self,
        table: &'static str,
        user_id: i64,
        article_id: i64,
    ) -> Result<BookmarkOutcome<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, ArticleStatus>("SELECT status FROM articles WHERE id = $1 FOR SHARE")
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;
        if !matches!(status, Some(status) if status.is_published()) {
            return Ok(BookmarkOutcome::ArticleUnavailable);
        }

        let sql = format!(
            "INSERT INTO {} (user_id, article_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, article_id) DO NOTHING RETURNING *",
            table
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(user_id)
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(match row {
            Some(row) => BookmarkOutcome::Created(row),
            None => BookmarkOutcome::Duplicate,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, middle_name, birth_year, avatar, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.middle_name)
        .bind(user.birth_year)
        .bind(user.avatar)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users(&self, ids: &[i64]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5,
                middle_name = $6, birth_year = $7, avatar = $8, is_active = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.middle_name)
        .bind(user.birth_year)
        .bind(&user.avatar)
        .bind(user.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn insert_topic(&self, topic: NewTopic) -> Result<Topic> {
        let topic = sqlx::query_as::<_, Topic>(
            "INSERT INTO topics (name, description, is_active) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(topic.name)
        .bind(topic.description)
        .bind(topic.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(topic)
    }

    async fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(topic)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let topics = sqlx::query_as::<_, Topic>("SELECT * FROM topics ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(topics)
    }

    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            INSERT INTO articles (author_id, title, summary, content, thumbnail, status, views_count, reads_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(article.author_id)
        .bind(article.title)
        .bind(article.summary)
        .bind(article.content)
        .bind(article.thumbnail)
        .bind(article.status)
        .bind(article.views_count)
        .bind(article.reads_count)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO article_topics (article_id, topic_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
        )
        .bind(row.id)
        .bind(article.topic_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Inserted article {}", row.id);

        let mut articles = self.attach_topics(vec![row]).await?;
        articles
            .pop()
            .ok_or_else(|| AppError::internal("Inserted article vanished"))
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.attach_one(row).await
    }

    async fn update_article(&self, id: i64, changes: ArticleChanges) -> Result<Option<Article>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            UPDATE articles
            SET title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                content = COALESCE($4, content),
                thumbnail = COALESCE($5, thumbnail),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.summary)
        .bind(changes.content)
        .bind(changes.thumbnail)
        .bind(changes.status)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(topic_ids) = changes.topic_ids {
            sqlx::query("DELETE FROM article_topics WHERE article_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO article_topics (article_id, topic_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(topic_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.attach_one(Some(row)).await
    }

    async fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT a.* FROM articles a WHERE TRUE");

        if !filter.statuses.is_empty() {
            let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
            qb.push(" AND a.status::TEXT = ANY(").push_bind(statuses).push(")");
        }
        if let Some(author_id) = filter.author_id {
            qb.push(" AND a.author_id = ").push_bind(author_id);
        }
        if let Some(topic_id) = filter.topic_id {
            qb.push(" AND EXISTS (SELECT 1 FROM article_topics at WHERE at.article_id = a.id AND at.topic_id = ")
                .push_bind(topic_id)
                .push(")");
        }
        if let Some(ids) = &filter.ids {
            qb.push(" AND a.id = ANY(").push_bind(ids.clone()).push(")");
        }
        qb.push(" ORDER BY a.id");

        let rows: Vec<ArticleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.attach_topics(rows).await
    }

    async fn record_view(&self, article_id: i64, user_id: i64) -> Result<Option<Article>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            UPDATE articles SET views_count = views_count + 1
            WHERE id = $1 AND status <> 'trash'
            RETURNING *
            "#,
        )
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?;

        if row.is_none() {
            return Ok(None);
        }

        sqlx::query("INSERT INTO reading_history (user_id, article_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.attach_one(row).await
    }

    async fn increment_reads(&self, article_id: i64) -> Result<Option<i64>> {
        let reads = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE articles SET reads_count = reads_count + 1
            WHERE id = $1 AND status = 'publish'
            RETURNING reads_count
            "#,
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reads)
    }

    async fn author_read_totals(&self) -> Result<Vec<(i64, i64)>> {
        let totals = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT author_id, SUM(reads_count)::BIGINT
            FROM articles
            WHERE status = 'publish'
            GROUP BY author_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn add_clap(&self, article_id: i64, user_id: i64, cap: i32) -> Result<Option<i32>> {
        // 文章未发布时 SELECT 不产生行，也就不会插入或更新
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO claps (article_id, user_id, count)
            SELECT a.id, $2, 1 FROM articles a WHERE a.id = $1 AND a.status = 'publish'
            ON CONFLICT (article_id, user_id)
            DO UPDATE SET count = LEAST(claps.count + 1, $3), updated_at = NOW()
            RETURNING count
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(cap)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert_clap(&self, article_id: i64, user_id: i64, count: i32) -> Result<Option<Clap>> {
        let clap = sqlx::query_as::<_, Clap>(
            r#"
            INSERT INTO claps (article_id, user_id, count) VALUES ($1, $2, $3)
            ON CONFLICT (article_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(count)
        .fetch_optional(&self.pool)
        .await?;
        Ok(clap)
    }

    async fn get_clap(&self, article_id: i64, user_id: i64) -> Result<Option<Clap>> {
        let clap = sqlx::query_as::<_, Clap>("SELECT * FROM claps WHERE article_id = $1 AND user_id = $2")
            .bind(article_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(clap)
    }

    async fn delete_clap(&self, article_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM claps WHERE article_id = $1 AND user_id = $2")
            .bind(article_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_favorite(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Favorite>> {
        self.insert_bookmark("favorites", user_id, article_id).await
    }

    async fn delete_favorite(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND article_id = $2")
            .bind(user_id)
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_favorites(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(favorites)
    }

    async fn insert_pin(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Pin>> {
        self.insert_bookmark("pins", user_id, article_id).await
    }

    async fn delete_pin(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pins WHERE user_id = $1 AND article_id = $2")
            .bind(user_id)
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pins(&self, user_id: i64) -> Result<Vec<Pin>> {
        let pins = sqlx::query_as::<_, Pin>("SELECT * FROM pins WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(pins)
    }

    async fn insert_archive(&self, user_id: i64, article_id: i64) -> Result<BookmarkOutcome<Archive>> {
        self.insert_bookmark("archives", user_id, article_id).await
    }

    async fn delete_archive(&self, user_id: i64, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM archives WHERE user_id = $1 AND article_id = $2")
            .bind(user_id)
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_archives(&self, user_id: i64) -> Result<Vec<Archive>> {
        let archives = sqlx::query_as::<_, Archive>("SELECT * FROM archives WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(archives)
    }

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> Result<Option<Follow>> {
        let follow = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(follow)
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_followers(&self, user_id: i64) -> Result<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>("SELECT * FROM follows WHERE followee_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(follows)
    }

    async fn list_following(&self, user_id: i64) -> Result<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>("SELECT * FROM follows WHERE follower_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(follows)
    }

    async fn insert_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<Option<TopicFollow>> {
        let follow = sqlx::query_as::<_, TopicFollow>(
            r#"
            INSERT INTO topic_follows (user_id, topic_id) VALUES ($1, $2)
            ON CONFLICT (user_id, topic_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(follow)
    }

    async fn delete_topic_follow(&self, user_id: i64, topic_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM topic_follows WHERE user_id = $1 AND topic_id = $2")
            .bind(user_id)
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn file_report(&self, article_id: i64, user_id: i64, threshold: i64) -> Result<ReportOutcome> {
        let mut tx = self.pool.begin().await?;

        // 锁住文章行，同一篇文章的举报在这里串行化
        let status = sqlx::query_scalar::<_, ArticleStatus>("SELECT status FROM articles WHERE id = $1 FOR UPDATE")
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;

        let status = match status {
            Some(status) if status.is_published() => status,
            _ => return Ok(ReportOutcome::ArticleUnavailable),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO reports (article_id, user_id) VALUES ($1, $2)
            ON CONFLICT (article_id, user_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Ok(ReportOutcome::Duplicate);
        }

        let reporters = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM reports WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_one(&mut *tx)
        .await?;

        let next = status.after_report(reporters, threshold);
        let outcome = if next != status {
            sqlx::query("UPDATE articles SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(article_id)
                .bind(next)
                .execute(&mut *tx)
                .await?;
            ReportOutcome::Removed { reporters }
        } else {
            ReportOutcome::Filed { reporters }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn count_reporters(&self, article_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM reports WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_reading_history(&self, user_id: i64) -> Result<Vec<ReadingHistory>> {
        let history = sqlx::query_as::<_, ReadingHistory>(
            "SELECT * FROM reading_history WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }

    async fn insert_notification(&self, user_id: i64, message: &str) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, message) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    async fn get_notification(&self, id: i64) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(notification)
    }

    async fn list_unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 AND read_at IS NULL ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $3 WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(
        &self,
        article_id: i64,
        user_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        // 回复通过 parent_id 的 ON DELETE CASCADE 一并删除
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE article_id = $1 ORDER BY id",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn apply_preference(&self, user_id: i64, topic_ids: &[i64], signal: PreferenceSignal) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for &topic_id in topic_ids {
            sqlx::query(
                r#"
                INSERT INTO topic_preferences (user_id, topic_id, weight) VALUES ($1, $2, 0)
                ON CONFLICT (user_id, topic_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(topic_id)
            .execute(&mut *tx)
            .await?;

            let weight = sqlx::query_scalar::<_, i32>(
                "SELECT weight FROM topic_preferences WHERE user_id = $1 AND topic_id = $2 FOR UPDATE",
            )
            .bind(user_id)
            .bind(topic_id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE topic_preferences SET weight = $3, updated_at = NOW() WHERE user_id = $1 AND topic_id = $2",
            )
            .bind(user_id)
            .bind(topic_id)
            .bind(signal.apply(weight))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_preferences(&self, user_id: i64) -> Result<Vec<TopicPreference>> {
        let preferences = sqlx::query_as::<_, TopicPreference>(
            "SELECT * FROM topic_preferences WHERE user_id = $1 ORDER BY topic_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(preferences)
    }

    async fn insert_faq(&self, question: &str, answer: &str) -> Result<Faq> {
        let faq = sqlx::query_as::<_, Faq>("INSERT INTO faqs (question, answer) VALUES ($1, $2) RETURNING *")
            .bind(question)
            .bind(answer)
            .fetch_one(&self.pool)
            .await?;
        Ok(faq)
    }

    async fn list_faqs(&self) -> Result<Vec<Faq>> {
        let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(faqs)
    }
}
