use crate::{
    error::{AppError, Result},
    models::{notification::Notification, user::User},
    services::Database,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn notify(&self, user_id: i64, message: &str) -> Result<Notification> {
        debug!("Creating notification for user {}", user_id);
        self.db.insert_notification(user_id, message).await
    }

    /// 通知是附带效果，失败只记录日志，不影响主操作
    pub async fn notify_quietly(&self, user_id: i64, message: &str) {
        if let Err(e) = self.notify(user_id, message).await {
            warn!("Failed to notify user {}: {}", user_id, e);
        }
    }

    /// 未读通知，最新的在前
    pub async fn list_unread(&self, user: &User) -> Result<Vec<Notification>> {
        let mut notifications = self.db.list_unread_notifications(user.id).await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    /// 只能查看自己的未读通知；已读的视为不存在
    pub async fn get_unread(&self, user: &User, id: i64) -> Result<Notification> {
        match self.db.get_notification(id).await? {
            Some(n) if n.user_id == user.id && n.is_unread() => Ok(n),
            _ => Err(AppError::not_found("Notification")),
        }
    }

    pub async fn mark_read(&self, user: &User, id: i64) -> Result<()> {
        if !self.db.mark_notification_read(id, user.id, Utc::now()).await? {
            return Err(AppError::not_found("Notification"));
        }
        info!("Notification {} marked read by user {}", id, user.id);
        Ok(())
    }
}
