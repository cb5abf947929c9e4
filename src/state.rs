use crate::{
    config::Config,
    error::Result,
    models::response::Page,
    services::{
        database::Database,
        auth::AuthService,
        article::ArticleService,
        engagement::EngagementService,
        follow::FollowService,
        moderation::ModerationService,
        comment::CommentService,
        notification::NotificationService,
        recommendation::RecommendationService,
        topic::TopicService,
        user::UserService,
    },
};
use std::sync::Arc;

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 数据库连接
    pub db: Arc<Database>,

    /// 认证服务
    pub auth_service: AuthService,

    /// 文章服务
    pub article_service: ArticleService,

    /// 鼓掌 / 阅读 / 收藏 / 置顶
    pub engagement_service: EngagementService,

    /// 关注服务
    pub follow_service: FollowService,

    /// 举报服务
    pub moderation_service: ModerationService,

    /// 评论服务
    pub comment_service: CommentService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 推荐服务
    pub recommendation_service: RecommendationService,

    /// 话题与 FAQ
    pub topic_service: TopicService,

    /// 用户服务
    pub user_service: UserService,
}

impl AppState {
    /// 初始化所有服务
    pub async fn new(config: Config, db: Database) -> Result<Self> {
        let db = Arc::new(db);

        let auth_service = AuthService::new(&config, db.clone()).await?;
        let notification_service = NotificationService::new(db.clone()).await?;
        let recommendation_service = RecommendationService::new(db.clone()).await?;
        let article_service = ArticleService::new(db.clone(), recommendation_service.clone()).await?;
        let engagement_service = EngagementService::new(db.clone(), &config).await?;
        let follow_service = FollowService::new(db.clone(), notification_service.clone()).await?;
        let moderation_service =
            ModerationService::new(db.clone(), notification_service.clone(), &config).await?;
        let comment_service = CommentService::new(db.clone(), notification_service.clone()).await?;
        let topic_service = TopicService::new(db.clone()).await?;
        let user_service = UserService::new(db.clone(), &config).await?;

        Ok(Self {
            config,
            db,
            auth_service,
            article_service,
            engagement_service,
            follow_service,
            moderation_service,
            comment_service,
            notification_service,
            recommendation_service,
            topic_service,
            user_service,
        })
    }

    /// 获取分页配置
    pub fn page(&self, page: Option<usize>, page_size: Option<usize>) -> Page {
        Page::resolve(
            page,
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }
}
