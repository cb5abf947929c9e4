use crate::{
    error::{AppError, Result},
    models::{
        article::*,
        user::{AuthorInfo, User},
    },
    services::{recommendation::parse_top_count, Database, RecommendationService},
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct ArticleService {
    db: Arc<Database>,
    recommendations: RecommendationService,
}

impl ArticleService {
    pub async fn new(db: Arc<Database>, recommendations: RecommendationService) -> Result<Self> {
        Ok(Self { db, recommendations })
    }

    pub async fn create_article(&self, author: &User, request: CreateArticleRequest) -> Result<ArticleResponse> {
        debug!("Creating article for user: {}", author.id);

        request.validate()?;

        let status = match request.status {
            Some(ArticleStatus::Trash) => return Err(invalid_status()),
            Some(status) => status,
            None => ArticleStatus::Publish,
        };
        let topic_ids = self.ensure_topics(&request.topic_ids).await?;

        let article = self
            .db
            .insert_article(NewArticle {
                author_id: author.id,
                title: request.title,
                summary: request.summary,
                content: request.content,
                thumbnail: request.thumbnail,
                status,
                topic_ids,
                ..Default::default()
            })
            .await?;

        info!("Created article {} ({}) by user {}", article.id, status.as_str(), author.id);
        Ok(ArticleResponse::new(article, AuthorInfo::from(author)))
    }

    /// 文章详情。每次成功获取都会浏览数 +1 并写一条阅读历史（作者本人也算）。
    pub async fn get_article(&self, user: &User, id: i64) -> Result<ArticleResponse> {
        debug!("Fetching article {} for user {}", id, user.id);

        match self.db.get_article(id).await? {
            Some(article) if article.is_visible_to(user.id) => {}
            _ => return Err(AppError::not_found("Article")),
        }

        let article = self
            .db
            .record_view(id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Article"))?;

        let author = self.db.author_info(article.author_id).await?;
        Ok(ArticleResponse::new(article, author))
    }

    pub async fn update_article(&self, user: &User, id: i64, request: UpdateArticleRequest) -> Result<ArticleResponse> {
        debug!("Updating article {} by user {}", id, user.id);

        let article = self.editable_article(user, id).await?;
        request.validate()?;

        let status = match request.status {
            Some(ArticleStatus::Trash) => return Err(invalid_status()),
            Some(target) => Some(article.status.transition(target)?),
            None => None,
        };
        let topic_ids = match &request.topic_ids {
            Some(ids) => Some(self.ensure_topics(ids).await?),
            None => None,
        };

        let changes = ArticleChanges {
            title: request.title,
            summary: request.summary,
            content: request.content,
            thumbnail: request.thumbnail,
            status,
            topic_ids,
        };

        let updated = self
            .db
            .update_article(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("Article"))?;

        info!("Updated article {}", id);
        Ok(ArticleResponse::new(updated, AuthorInfo::from(user)))
    }

    /// 软删除：移到回收站
    pub async fn delete_article(&self, user: &User, id: i64) -> Result<()> {
        let article = self.editable_article(user, id).await?;
        let status = article.status.transition(ArticleStatus::Trash)?;

        self.db
            .update_article(
                id,
                ArticleChanges {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("Article"))?;

        info!("Article {} moved to trash by its author", id);
        Ok(())
    }

    /// 已发布文章列表，支持 topic_id / is_recommend / get_top_articles
    pub async fn list_articles(&self, user: &User, query: &ArticleListQuery) -> Result<Vec<ArticleListItem>> {
        debug!("Fetching articles list with query: {:?}", query);

        let top = query
            .get_top_articles
            .as_deref()
            .map(parse_top_count)
            .transpose()?;

        let filter = ArticleFilter {
            topic_id: query.topic_id,
            ..ArticleFilter::published()
        };
        let mut articles = self.db.list_articles(&filter).await?;
        articles.sort_by(Article::newest_first);

        if query.is_recommend.unwrap_or(false) {
            articles = self.recommendations.recommended(user, articles).await?;
        }
        if let Some(n) = top {
            articles = RecommendationService::top_articles(articles, n);
        }

        self.db.article_items(articles).await
    }

    /// 不区分大小写的子串搜索
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ArticleListItem>> {
        debug!("Searching articles: {:?}", query);

        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let search_title = query.search_title.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut articles: Vec<Article> = self
            .db
            .list_articles(&ArticleFilter::published())
            .await?
            .into_iter()
            .filter(|a| search.map_or(true, |term| a.matches_search(term)))
            .filter(|a| search_title.map_or(true, |term| a.matches_title(term)))
            .collect();
        articles.sort_by(Article::newest_first);

        self.db.article_items(articles).await
    }

    async fn editable_article(&self, user: &User, id: i64) -> Result<Article> {
        let article = match self.db.get_article(id).await? {
            Some(article) if !article.status.is_terminal() => article,
            _ => return Err(AppError::not_found("Article")),
        };

        if article.author_id != user.id {
            return Err(AppError::forbidden());
        }
        Ok(article)
    }

    /// 话题必须存在且启用，去重后保持原顺序
    async fn ensure_topics(&self, topic_ids: &[i64]) -> Result<Vec<i64>> {
        let mut unique = Vec::with_capacity(topic_ids.len());
        for &id in topic_ids {
            if unique.contains(&id) {
                continue;
            }
            match self.db.get_topic(id).await? {
                Some(topic) if topic.is_active => unique.push(id),
                _ => {
                    return Err(AppError::field(
                        "topic_ids",
                        &format!("Invalid pk \"{}\" - object does not exist.", id),
                    ))
                }
            }
        }
        Ok(unique)
    }
}

fn invalid_status() -> AppError {
    AppError::field("status", "\"trash\" is not a valid choice.")
}
