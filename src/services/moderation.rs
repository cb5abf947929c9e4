use crate::{
    config::Config,
    error::{AppError, Result},
    models::{report::ReportOutcome, user::User},
    services::{Database, NotificationService},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 举报与自动下架
///
/// 举报写入、不同举报人计数以及 publish -> trash 的状态迁移由存储层在同一个
/// 原子操作里完成；这里只负责把结果翻译成错误和通知。
#[derive(Clone)]
pub struct ModerationService {
    db: Arc<Database>,
    notifications: NotificationService,
    threshold: i64,
}

impl ModerationService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            notifications,
            threshold: config.report_threshold,
        })
    }

    pub async fn report_article(&self, user: &User, article_id: i64) -> Result<ReportOutcome> {
        debug!("User {} reporting article {}", user.id, article_id);

        let outcome = self.db.file_report(article_id, user.id, self.threshold).await?;
        match outcome {
            ReportOutcome::ArticleUnavailable => Err(AppError::not_found("Article")),
            ReportOutcome::Duplicate => Err(AppError::conflict("This article has already been reported.")),
            ReportOutcome::Filed { reporters } => {
                info!("Article {} reported by user {} ({} reporters)", article_id, user.id, reporters);
                Ok(outcome)
            }
            ReportOutcome::Removed { reporters } => {
                warn!(
                    "Article {} moved to trash after {} reports (threshold {})",
                    article_id, reporters, self.threshold
                );
                self.notify_author(article_id).await;
                Ok(outcome)
            }
        }
    }

    async fn notify_author(&self, article_id: i64) {
        let article = match self.db.get_article(article_id).await {
            Ok(Some(article)) => article,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not load removed article {}: {}", article_id, e);
                return;
            }
        };

        self.notifications
            .notify_quietly(
                article.author_id,
                &format!("Your article \"{}\" was removed due to multiple reports.", article.title),
            )
            .await;
    }
}
