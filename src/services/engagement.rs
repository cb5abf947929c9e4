use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        article::{Article, ArticleFilter, ArticleListItem, ArticleStatus},
        clap::ClapResponse,
        favorite::{ArchiveWithArticle, BookmarkOutcome, FavoriteWithArticle},
        reading_history::ReadingHistoryEntry,
        user::User,
    },
    services::Database,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info};

/// 鼓掌、阅读计数、收藏、置顶、阅读历史
#[derive(Clone)]
pub struct EngagementService {
    db: Arc<Database>,
    max_claps: i32,
}

impl EngagementService {
    pub async fn new(db: Arc<Database>, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            max_claps: config.max_claps_per_user,
        })
    }

    /// 每次 +1，达到上限后保持不变但仍返回成功
    pub async fn clap(&self, user: &User, article_id: i64) -> Result<ClapResponse> {
        debug!("User {} clapping article {}", user.id, article_id);

        let count = self
            .db
            .add_clap(article_id, user.id, self.max_claps)
            .await?
            .ok_or_else(|| AppError::not_found("Article"))?;

        info!("Article {} clap count for user {} is now {}", article_id, user.id, count);
        Ok(ClapResponse { count })
    }

    pub async fn undo_clap(&self, user: &User, article_id: i64) -> Result<()> {
        if !self.db.delete_clap(article_id, user.id).await? {
            return Err(AppError::not_found("Clap"));
        }
        info!("User {} removed claps from article {}", user.id, article_id);
        Ok(())
    }

    /// 显式"已读"，可重复、不设上限
    pub async fn increment_reads(&self, user: &User, article_id: i64) -> Result<i64> {
        let reads = self
            .db
            .increment_reads(article_id)
            .await?
            .ok_or_else(|| AppError::not_found("Article"))?;

        debug!("User {} read article {} (reads_count={})", user.id, article_id, reads);
        Ok(reads)
    }

    pub async fn favorite(&self, user: &User, article_id: i64) -> Result<()> {
        match self.db.insert_favorite(user.id, article_id).await? {
            BookmarkOutcome::Created(_) => {}
            BookmarkOutcome::Duplicate => {
                return Err(AppError::conflict("This article is already in your favorites."))
            }
            BookmarkOutcome::ArticleUnavailable => return Err(AppError::not_found("Article")),
        }
        info!("User {} favorited article {}", user.id, article_id);
        Ok(())
    }

    pub async fn unfavorite(&self, user: &User, article_id: i64) -> Result<()> {
        if !self.db.delete_favorite(user.id, article_id).await? {
            return Err(AppError::not_found("Favorite"));
        }
        info!("User {} removed article {} from favorites", user.id, article_id);
        Ok(())
    }

    pub async fn pin(&self, user: &User, article_id: i64) -> Result<()> {
        match self.db.insert_pin(user.id, article_id).await? {
            BookmarkOutcome::Created(_) => {}
            BookmarkOutcome::Duplicate => return Err(AppError::conflict("This article is already pinned.")),
            BookmarkOutcome::ArticleUnavailable => return Err(AppError::not_found("Article")),
        }
        info!("User {} pinned article {}", user.id, article_id);
        Ok(())
    }

    pub async fn unpin(&self, user: &User, article_id: i64) -> Result<()> {
        if !self.db.delete_pin(user.id, article_id).await? {
            return Err(AppError::not_found("Pin"));
        }
        info!("User {} unpinned article {}", user.id, article_id);
        Ok(())
    }

    /// 归档到自己的存档列表
    pub async fn archive(&self, user: &User, article_id: i64) -> Result<()> {
        match self.db.insert_archive(user.id, article_id).await? {
            BookmarkOutcome::Created(_) => {}
            BookmarkOutcome::Duplicate => return Err(AppError::conflict("This article is already archived.")),
            BookmarkOutcome::ArticleUnavailable => return Err(AppError::not_found("Article")),
        }
        info!("User {} archived article {}", user.id, article_id);
        Ok(())
    }

    pub async fn unarchive(&self, user: &User, article_id: i64) -> Result<()> {
        if !self.db.delete_archive(user.id, article_id).await? {
            return Err(AppError::not_found("Archive"));
        }
        info!("User {} removed article {} from archive", user.id, article_id);
        Ok(())
    }

    /// 已归档的文章，最近归档的在前；不可见的文章跳过
    pub async fn archived(&self, user: &User) -> Result<Vec<ArchiveWithArticle>> {
        let mut archives = self.db.list_archives(user.id).await?;
        archives.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let ids: Vec<i64> = archives.iter().map(|a| a.article_id).collect();
        let items = self.visible_items(user, &ids).await?;

        Ok(archives
            .into_iter()
            .filter_map(|a| {
                items.iter().find(|item| item.id == a.article_id).map(|item| ArchiveWithArticle {
                    id: a.id,
                    article: item.clone(),
                    created_at: a.created_at,
                })
            })
            .collect())
    }

    /// 阅读历史，最新的在前；已进回收站的文章不再展示
    pub async fn reading_history(&self, user: &User) -> Result<Vec<ReadingHistoryEntry>> {
        let mut history = self.db.list_reading_history(user.id).await?;
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let ids: Vec<i64> = history.iter().map(|h| h.article_id).collect();
        let items = self.visible_items(user, &ids).await?;

        Ok(history
            .into_iter()
            .filter_map(|h| {
                items.iter().find(|item| item.id == h.article_id).map(|item| ReadingHistoryEntry {
                    id: h.id,
                    article: item.clone(),
                    created_at: h.created_at,
                })
            })
            .collect())
    }

    pub async fn favorites(&self, user: &User) -> Result<Vec<FavoriteWithArticle>> {
        let mut favorites = self.db.list_favorites(user.id).await?;
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let ids: Vec<i64> = favorites.iter().map(|f| f.article_id).collect();
        let items = self.visible_items(user, &ids).await?;

        Ok(favorites
            .into_iter()
            .filter_map(|f| {
                items.iter().find(|item| item.id == f.article_id).map(|item| FavoriteWithArticle {
                    id: f.id,
                    article: item.clone(),
                    created_at: f.created_at,
                })
            })
            .collect())
    }

    /// 个人文章列表：置顶的在最前（按置顶时间倒序），其余为自己未删除的文章，新的在前
    pub async fn my_articles(&self, user: &User) -> Result<Vec<ArticleListItem>> {
        let mut pins = self.db.list_pins(user.id).await?;
        pins.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let pinned_ids: Vec<i64> = pins.iter().map(|p| p.article_id).collect();
        let pinned: Vec<Article> = self
            .db
            .articles_by_ids(&pinned_ids)
            .await?
            .into_iter()
            .filter(|a| a.is_visible_to(user.id))
            .collect();
        let seen: HashSet<i64> = pinned.iter().map(|a| a.id).collect();

        let filter = ArticleFilter {
            statuses: vec![ArticleStatus::Draft, ArticleStatus::Pending, ArticleStatus::Publish],
            author_id: Some(user.id),
            ..Default::default()
        };
        let mut own: Vec<Article> = self
            .db
            .list_articles(&filter)
            .await?
            .into_iter()
            .filter(|a| !seen.contains(&a.id))
            .collect();
        own.sort_by(Article::newest_first);

        let mut articles = pinned;
        articles.extend(own);
        self.db.article_items(articles).await
    }

    async fn visible_items(&self, user: &User, ids: &[i64]) -> Result<Vec<ArticleListItem>> {
        let mut unique: Vec<i64> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let articles: Vec<Article> = self
            .db
            .articles_by_ids(&unique)
            .await?
            .into_iter()
            .filter(|a| a.is_visible_to(user.id))
            .collect();
        self.db.article_items(articles).await
    }
}
