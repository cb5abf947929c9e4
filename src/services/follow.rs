use crate::{
    error::{AppError, Result},
    models::{
        follow::FollowOutcome,
        user::{AuthorInfo, User},
    },
    services::{Database, NotificationService},
};
use std::sync::Arc;
use tracing::{debug, info};

/// 关注作者和话题
#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl FollowService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService) -> Result<Self> {
        Ok(Self { db, notifications })
    }

    /// 重复关注不是错误，返回 `AlreadyFollowing`
    pub async fn follow_author(&self, follower: &User, author_id: i64) -> Result<FollowOutcome> {
        debug!("User {} following author {}", follower.id, author_id);

        if follower.id == author_id {
            return Err(AppError::not_found("User"));
        }
        match self.db.get_user(author_id).await? {
            Some(author) if author.is_active => {}
            _ => return Err(AppError::not_found("User")),
        }

        if self.db.insert_follow(follower.id, author_id).await?.is_none() {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        info!("User {} now follows {}", follower.id, author_id);
        self.notifications
            .notify_quietly(author_id, &format!("{} started following you.", follower.username))
            .await;
        Ok(FollowOutcome::Followed)
    }

    pub async fn unfollow_author(&self, follower: &User, author_id: i64) -> Result<()> {
        if !self.db.delete_follow(follower.id, author_id).await? {
            return Err(AppError::not_found("Follow"));
        }
        info!("User {} unfollowed {}", follower.id, author_id);
        Ok(())
    }

    pub async fn followers(&self, user: &User) -> Result<Vec<AuthorInfo>> {
        let mut follows = self.db.list_followers(user.id).await?;
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        self.people(follows.iter().map(|f| f.follower_id).collect()).await
    }

    pub async fn following(&self, user: &User) -> Result<Vec<AuthorInfo>> {
        let mut follows = self.db.list_following(user.id).await?;
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        self.people(follows.iter().map(|f| f.followee_id).collect()).await
    }

    pub async fn follow_topic(&self, user: &User, topic_id: i64) -> Result<FollowOutcome> {
        match self.db.get_topic(topic_id).await? {
            Some(topic) if topic.is_active => {}
            _ => return Err(AppError::not_found("Topic")),
        }

        if self.db.insert_topic_follow(user.id, topic_id).await?.is_none() {
            return Ok(FollowOutcome::AlreadyFollowing);
        }
        info!("User {} follows topic {}", user.id, topic_id);
        Ok(FollowOutcome::Followed)
    }

    pub async fn unfollow_topic(&self, user: &User, topic_id: i64) -> Result<()> {
        match self.db.get_topic(topic_id).await? {
            Some(topic) if topic.is_active => {}
            _ => return Err(AppError::not_found("Topic")),
        }

        if !self.db.delete_topic_follow(user.id, topic_id).await? {
            return Err(AppError::not_found("TopicFollow"));
        }
        info!("User {} unfollowed topic {}", user.id, topic_id);
        Ok(())
    }

    async fn people(&self, ids: Vec<i64>) -> Result<Vec<AuthorInfo>> {
        let users = self.db.author_map(ids.iter().copied()).await?;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}
