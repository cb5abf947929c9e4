use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        article::{Article, ArticleFilter, ArticleListItem},
        user::AuthorInfo,
    },
    storage::{MemoryStore, PostgresStore, Store},
};
use std::{collections::HashMap, ops::Deref, sync::Arc};
use tracing::{error, info};

/// 数据库服务
///
/// 包装具体的存储后端。`Deref` 到 [`Store`]，服务层可以直接调用存储方法。
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn Store>,
    backend: &'static str,
}

impl Database {
    /// 根据 `DATABASE_URL` 选择存储后端
    pub async fn new(config: &Config) -> Result<Self> {
        if config.uses_memory_store() {
            info!("Using in-memory store");
            return Ok(Self::memory());
        }

        info!("Initializing database connection");
        let store = PostgresStore::connect(config).await?;
        Ok(Self {
            store: Arc::new(store),
            backend: "postgres",
        })
    }

    pub fn memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            backend: "memory",
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.store.ping().await {
            Ok(_) => {
                info!("Database connection verified successfully ({})", self.backend);
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(e)
            }
        }
    }

    /// 已发布的文章，否则视为不存在
    pub async fn published_article(&self, id: i64) -> Result<Article> {
        match self.store.get_article(id).await? {
            Some(article) if article.is_published() => Ok(article),
            _ => Err(AppError::not_found("Article")),
        }
    }

    pub async fn author_map(&self, ids: impl IntoIterator<Item = i64>) -> Result<HashMap<i64, AuthorInfo>> {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.store.get_users(&ids).await?;
        Ok(users.iter().map(|u| (u.id, AuthorInfo::from(u))).collect())
    }

    pub async fn author_info(&self, id: i64) -> Result<AuthorInfo> {
        Ok(self
            .store
            .get_user(id)
            .await?
            .map(|u| AuthorInfo::from(&u))
            .unwrap_or_else(|| AuthorInfo::deleted(id)))
    }

    /// 批量转换为列表项，保持输入顺序
    pub async fn article_items(&self, articles: Vec<Article>) -> Result<Vec<ArticleListItem>> {
        let authors = self.author_map(articles.iter().map(|a| a.author_id)).await?;

        Ok(articles
            .into_iter()
            .map(|article| {
                let author = authors
                    .get(&article.author_id)
                    .cloned()
                    .unwrap_or_else(|| AuthorInfo::deleted(article.author_id));
                ArticleListItem::new(article, author)
            })
            .collect())
    }

    /// 按 id 取文章，保持 `ids` 的顺序（允许重复），缺失的跳过
    pub async fn articles_by_ids(&self, ids: &[i64]) -> Result<Vec<Article>> {
        let filter = ArticleFilter {
            ids: Some(ids.to_vec()),
            ..Default::default()
        };
        let found: HashMap<i64, Article> = self
            .store
            .list_articles(&filter)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }
}

impl Deref for Database {
    type Target = dyn Store;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
