pub mod database;
pub mod auth;
pub mod user;
pub mod article;
pub mod engagement;
pub mod follow;
pub mod moderation;
pub mod comment;
pub mod notification;
pub mod recommendation;
pub mod topic;

// 重新导出常用类型
pub use database::Database;
pub use auth::AuthService;
pub use user::UserService;
pub use article::ArticleService;
pub use engagement::EngagementService;
pub use follow::FollowService;
pub use moderation::ModerationService;
pub use comment::CommentService;
pub use notification::NotificationService;
pub use recommendation::RecommendationService;
pub use topic::TopicService;
