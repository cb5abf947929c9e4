use crate::{
    error::Result,
    models::{
        article::ArticleListItem,
        favorite::{ArchiveWithArticle, FavoriteWithArticle},
        follow::FollowOutcome,
        notification::Notification,
        reading_history::ReadingHistoryEntry,
        recommendation::RecommendRequest,
        response::{DetailResponse, PageQuery, Paginated},
        user::{AuthorInfo, PopularAuthor, ProfileResponse, UpdateProfileRequest},
    },
    services::auth::AuthUser,
    state::AppState,
    utils::extract::{parse_id, JsonBody, QueryParams},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me/", get(get_profile).patch(update_profile))
        .route("/users/me/articles/", get(my_articles))
        .route("/users/articles/popular/", get(popular_authors))
        .route("/users/articles/history/", get(reading_history))
        .route("/users/favorites/", get(favorites))
        .route("/users/archive/", get(archived))
        .route("/users/followers/", get(followers))
        .route("/users/following/", get(following))
        .route("/users/recommend/", post(recommend))
        .route("/users/notifications/", get(list_notifications))
        .route(
            "/users/notifications/:id/",
            get(get_notification).patch(mark_notification_read),
        )
        .route("/users/:id/follow/", post(follow_author).delete(unfollow_author))
}

/// GET /users/me/
pub async fn get_profile(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>> {
    Ok(Json(app_state.user_service.profile(&user)))
}

/// PATCH /users/me/
pub async fn update_profile(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let profile = app_state.user_service.update_profile(&user, request).await?;
    Ok(Json(profile))
}

/// 自己的文章，置顶的在最前
/// GET /users/me/articles/
pub async fn my_articles(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<ArticleListItem>>> {
    let page = app_state.page(query.page, query.page_size);
    let items = app_state.engagement_service.my_articles(&user).await?;
    Ok(Json(Paginated::from_items(items, page, "/users/me/articles/")))
}

/// GET /users/articles/popular/
pub async fn popular_authors(
    State(app_state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<PopularAuthor>>> {
    let page = app_state.page(query.page, query.page_size);
    let authors = app_state.recommendation_service.popular_authors().await?;
    Ok(Json(Paginated::from_items(authors, page, "/users/articles/popular/")))
}

/// GET /users/articles/history/
pub async fn reading_history(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<ReadingHistoryEntry>>> {
    let page = app_state.page(query.page, query.page_size);
    let history = app_state.engagement_service.reading_history(&user).await?;
    Ok(Json(Paginated::from_items(history, page, "/users/articles/history/")))
}

/// GET /users/favorites/
pub async fn favorites(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<FavoriteWithArticle>>> {
    let page = app_state.page(query.page, query.page_size);
    let favorites = app_state.engagement_service.favorites(&user).await?;
    Ok(Json(Paginated::from_items(favorites, page, "/users/favorites/")))
}

/// GET /users/archive/
pub async fn archived(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<ArchiveWithArticle>>> {
    let page = app_state.page(query.page, query.page_size);
    let archives = app_state.engagement_service.archived(&user).await?;
    Ok(Json(Paginated::from_items(archives, page, "/users/archive/")))
}

/// GET /users/followers/
pub async fn followers(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<AuthorInfo>>> {
    let page = app_state.page(query.page, query.page_size);
    let people = app_state.follow_service.followers(&user).await?;
    Ok(Json(Paginated::from_items(people, page, "/users/followers/")))
}

/// GET /users/following/
pub async fn following(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<AuthorInfo>>> {
    let page = app_state.page(query.page, query.page_size);
    let people = app_state.follow_service.following(&user).await?;
    Ok(Json(Paginated::from_items(people, page, "/users/following/")))
}

/// more/less like this
/// POST /users/recommend/
pub async fn recommend(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<RecommendRequest>,
) -> Result<StatusCode> {
    app_state
        .recommendation_service
        .record_preference(&user, request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 未读通知
/// GET /users/notifications/
pub async fn list_notifications(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<Notification>>> {
    let page = app_state.page(query.page, query.page_size);
    let notifications = app_state.notification_service.list_unread(&user).await?;
    Ok(Json(Paginated::from_items(notifications, page, "/users/notifications/")))
}

/// GET /users/notifications/:id/
pub async fn get_notification(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Notification>> {
    let id = parse_id(&id, "Notification")?;
    let notification = app_state.notification_service.get_unread(&user, id).await?;
    Ok(Json(notification))
}

/// 标记为已读
/// PATCH /users/notifications/:id/
pub async fn mark_notification_read(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Notification")?;
    app_state.notification_service.mark_read(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/:id/follow/
pub async fn follow_author(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DetailResponse>)> {
    let id = parse_id(&id, "User")?;

    let response = match app_state.follow_service.follow_author(&user, id).await? {
        FollowOutcome::Followed => (
            StatusCode::CREATED,
            Json(DetailResponse::new("Successfully followed.")),
        ),
        FollowOutcome::AlreadyFollowing => (
            StatusCode::OK,
            Json(DetailResponse::new("You are already following this author.")),
        ),
    };
    Ok(response)
}

/// DELETE /users/:id/follow/
pub async fn unfollow_author(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "User")?;
    app_state.follow_service.unfollow_author(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
