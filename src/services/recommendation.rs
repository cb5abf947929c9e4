use crate::{
    error::{AppError, Result},
    models::{
        article::Article,
        recommendation::RecommendRequest,
        user::{AuthorInfo, PopularAuthor, User},
    },
    services::Database,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

#[derive(Clone)]
pub struct RecommendationService {
    db: Arc<Database>,
}

impl RecommendationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// "more/less like this"：把信号记到该文章的所有话题上
    pub async fn record_preference(&self, user: &User, request: RecommendRequest) -> Result<()> {
        let (article_id, signal) = request.signal().ok_or_else(|| {
            AppError::Validation("Provide exactly one of more_article_id or less_article_id.".to_string())
        })?;

        let article = match self.db.get_article(article_id).await? {
            Some(article) if article.is_visible_to(user.id) => article,
            _ => return Err(AppError::not_found("Article")),
        };

        let topic_ids: Vec<i64> = article.topics.iter().map(|t| t.id).collect();
        self.db.apply_preference(user.id, &topic_ids, signal).await?;

        info!(
            "User {} marked article {} as {:?} ({} topics)",
            user.id,
            article_id,
            signal,
            topic_ids.len()
        );
        Ok(())
    }

    /// 只保留带正权重话题的文章，按文章最高话题权重倒序
    pub async fn recommended(&self, user: &User, candidates: Vec<Article>) -> Result<Vec<Article>> {
        let weights: HashMap<i64, i32> = self
            .db
            .list_preferences(user.id)
            .await?
            .into_iter()
            .filter(|p| p.weight > 0)
            .map(|p| (p.topic_id, p.weight))
            .collect();

        debug!("User {} has {} positive topics", user.id, weights.len());
        if weights.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(i32, Article)> = candidates
            .into_iter()
            .filter_map(|article| {
                let score = article
                    .topics
                    .iter()
                    .filter_map(|t| weights.get(&t.id).copied())
                    .max()?;
                Some((score, article))
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| Article::newest_first(a, b)));
        Ok(scored.into_iter().map(|(_, article)| article).collect())
    }

    /// 按浏览量倒序取前 n 篇，平局时新文章在前
    pub fn top_articles(mut candidates: Vec<Article>, n: usize) -> Vec<Article> {
        candidates.sort_by(|a, b| {
            b.views_count
                .cmp(&a.views_count)
                .then_with(|| Article::newest_first(a, b))
        });
        candidates.truncate(n);
        candidates
    }

    /// 按已发布文章阅读量总和排名的作者
    pub async fn popular_authors(&self) -> Result<Vec<PopularAuthor>> {
        let totals: Vec<(i64, i64)> = self
            .db
            .author_read_totals()
            .await?
            .into_iter()
            .filter(|(_, total)| *total > 0)
            .collect();

        let ids: Vec<i64> = totals.iter().map(|(id, _)| *id).collect();
        let users: HashMap<i64, User> = self
            .db
            .get_users(&ids)
            .await?
            .into_iter()
            .filter(|u| u.is_active)
            .map(|u| (u.id, u))
            .collect();

        let mut authors: Vec<PopularAuthor> = totals
            .into_iter()
            .filter_map(|(id, total_reads)| {
                users.get(&id).map(|u| PopularAuthor {
                    author: AuthorInfo::from(u),
                    total_reads,
                })
            })
            .collect();

        authors.sort_by(|a, b| {
            b.total_reads
                .cmp(&a.total_reads)
                .then(a.author.id.cmp(&b.author.id))
        });
        Ok(authors)
    }
}

/// `get_top_articles` 查询参数
pub fn parse_top_count(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| AppError::field("get_top_articles", "Enter a number."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{article::ArticleStatus, topic::Topic};
    use chrono::{Duration, Utc};

    fn article(id: i64, views: i64, age_minutes: i64, topic_ids: &[i64]) -> Article {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Article {
            id,
            author_id: 1,
            title: format!("Article {}", id),
            summary: String::new(),
            content: String::new(),
            thumbnail: None,
            status: ArticleStatus::Publish,
            views_count: views,
            reads_count: 0,
            topics: topic_ids
                .iter()
                .map(|&tid| Topic {
                    id: tid,
                    name: format!("topic-{}", tid),
                    description: None,
                    is_active: true,
                })
                .collect(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_top_articles_orders_by_views_then_recency() {
        let articles = vec![
            article(1, 5, 30, &[]),
            article(2, 13, 20, &[]),
            article(3, 12, 10, &[]),
            article(4, 12, 5, &[]),
        ];

        let top: Vec<i64> = RecommendationService::top_articles(articles, 3)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(top, vec![2, 4, 3]);
    }

    #[test]
    fn test_parse_top_count_rejects_text() {
        assert_eq!(parse_top_count("2").unwrap(), 2);
        assert!(matches!(
            parse_top_count("None"),
            Err(AppError::Field { ref field, .. }) if field == "get_top_articles"
        ));
    }
}
