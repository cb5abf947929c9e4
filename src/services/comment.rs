use crate::{
    error::{AppError, Result},
    models::{
        comment::*,
        user::{AuthorInfo, User},
    },
    services::{Database, NotificationService},
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl CommentService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService) -> Result<Self> {
        Ok(Self { db, notifications })
    }

    pub async fn create_comment(
        &self,
        user: &User,
        article_id: i64,
        request: CreateCommentRequest,
    ) -> Result<CommentResponse> {
        debug!("User {} commenting on article {}", user.id, article_id);

        request.validate()?;
        let article = self.db.published_article(article_id).await?;

        // 回复必须属于同一篇文章
        if let Some(parent_id) = request.parent {
            match self.db.get_comment(parent_id).await? {
                Some(parent) if parent.article_id == article_id => {}
                _ => {
                    return Err(AppError::field(
                        "parent",
                        &format!("Invalid pk \"{}\" - object does not exist.", parent_id),
                    ))
                }
            }
        }

        let comment = self
            .db
            .insert_comment(article_id, user.id, request.parent, &request.content)
            .await?;
        info!("Comment {} created on article {}", comment.id, article_id);

        if article.author_id != user.id {
            self.notifications
                .notify_quietly(
                    article.author_id,
                    &format!("{} commented on your article \"{}\".", user.username, article.title),
                )
                .await;
        }

        Ok(CommentResponse::new(comment, AuthorInfo::from(user)))
    }

    pub async fn update_comment(
        &self,
        user: &User,
        comment_id: i64,
        request: UpdateCommentRequest,
    ) -> Result<CommentResponse> {
        self.owned_comment(user, comment_id).await?;
        request.validate()?;

        let comment = self
            .db
            .update_comment(comment_id, &request.content)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        info!("Comment {} updated", comment_id);
        Ok(CommentResponse::new(comment, AuthorInfo::from(user)))
    }

    pub async fn delete_comment(&self, user: &User, comment_id: i64) -> Result<()> {
        self.owned_comment(user, comment_id).await?;

        if !self.db.delete_comment(comment_id).await? {
            return Err(AppError::not_found("Comment"));
        }
        info!("Comment {} deleted", comment_id);
        Ok(())
    }

    /// 文章及其全部评论，按时间正序
    pub async fn article_comments(&self, article_id: i64) -> Result<ArticleComments> {
        let article = self.db.published_article(article_id).await?;

        let mut comments = self.db.list_comments(article_id).await?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let users = self.db.author_map(comments.iter().map(|c| c.user_id)).await?;
        let comments = comments
            .into_iter()
            .map(|comment| {
                let user = users
                    .get(&comment.user_id)
                    .cloned()
                    .unwrap_or_else(|| AuthorInfo::deleted(comment.user_id));
                CommentResponse::new(comment, user)
            })
            .collect();

        Ok(ArticleComments {
            id: article.id,
            title: article.title,
            comments,
        })
    }

    async fn owned_comment(&self, user: &User, comment_id: i64) -> Result<Comment> {
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        // 文章进回收站后其评论也不可再操作
        self.db.published_article(comment.article_id).await?;

        if comment.user_id != user.id {
            return Err(AppError::forbidden());
        }
        Ok(comment)
    }
}
