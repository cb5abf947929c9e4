use crate::{
    error::Result,
    models::{
        article::*,
        clap::ClapResponse,
        comment::{ArticleComments, CommentResponse, CreateCommentRequest, UpdateCommentRequest},
        faq::Faq,
        follow::FollowOutcome,
        report::ReportOutcome,
        response::{DetailResponse, PageQuery, Paginated},
        topic::Topic,
    },
    services::auth::AuthUser,
    state::AppState,
    utils::extract::{parse_id, JsonBody, QueryParams},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/articles/", get(list_articles).post(create_article))
        .route("/articles/search/", get(search_articles))
        .route("/articles/topics/", get(list_topics))
        .route("/articles/topics/:id/follow/", post(follow_topic).delete(unfollow_topic))
        .route("/articles/faqs/", get(list_faqs))
        .route("/articles/comments/:id/", patch(update_comment).delete(delete_comment))
        .route(
            "/articles/:id/",
            get(get_article).patch(update_article).delete(delete_article),
        )
        .route("/articles/:id/clap/", post(clap).delete(undo_clap))
        .route("/articles/:id/read/", post(read_article))
        .route("/articles/:id/favorite/", post(favorite).delete(unfavorite))
        .route("/articles/:id/pin/", post(pin).delete(unpin))
        .route("/articles/:id/unpin/", delete(unpin))
        .route("/articles/:id/archive/", post(archive_article).delete(unarchive_article))
        .route("/articles/:id/report/", post(report_article))
        .route("/articles/:id/comments/", post(create_comment))
        .route("/articles/:id/detail/comments/", get(article_comments))
}

/// 已发布文章列表
/// GET /articles/
pub async fn list_articles(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<ArticleListQuery>,
) -> Result<Json<Paginated<ArticleListItem>>> {
    let page = app_state.page(query.page, query.page_size);
    let items = app_state.article_service.list_articles(&user, &query).await?;
    Ok(Json(Paginated::from_items(items, page, "/articles/")))
}

/// POST /articles/
pub async fn create_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>)> {
    let article = app_state.article_service.create_article(&user, request).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// GET /articles/search/?search=term | ?search_title=term
pub async fn search_articles(
    State(app_state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Paginated<ArticleListItem>>> {
    let page = app_state.page(query.page, query.page_size);
    let items = app_state.article_service.search(&query).await?;
    Ok(Json(Paginated::from_items(items, page, "/articles/search/")))
}

/// 文章详情（浏览数 +1，记录阅读历史）
/// GET /articles/:id/
pub async fn get_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ArticleResponse>> {
    let id = parse_id(&id, "Article")?;
    let article = app_state.article_service.get_article(&user, id).await?;
    Ok(Json(article))
}

/// PATCH /articles/:id/
pub async fn update_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>> {
    let id = parse_id(&id, "Article")?;
    let article = app_state.article_service.update_article(&user, id, request).await?;
    Ok(Json(article))
}

/// DELETE /articles/:id/
pub async fn delete_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Article")?;
    app_state.article_service.delete_article(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /articles/:id/clap/
pub async fn clap(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ClapResponse>)> {
    let id = parse_id(&id, "Article")?;
    let response = app_state.engagement_service.clap(&user, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /articles/:id/clap/
pub async fn undo_clap(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Clap")?;
    app_state.engagement_service.undo_clap(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /articles/:id/read/
pub async fn read_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>> {
    let id = parse_id(&id, "Article")?;
    app_state.engagement_service.increment_reads(&user, id).await?;
    Ok(Json(DetailResponse::new("Article read count increased.")))
}

/// POST /articles/:id/favorite/
pub async fn favorite(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DetailResponse>)> {
    let id = parse_id(&id, "Article")?;
    app_state.engagement_service.favorite(&user, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DetailResponse::new("Article added to favorites.")),
    ))
}

/// DELETE /articles/:id/favorite/
pub async fn unfavorite(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Favorite")?;
    app_state.engagement_service.unfavorite(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /articles/:id/pin/
pub async fn pin(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>> {
    let id = parse_id(&id, "Article")?;
    app_state.engagement_service.pin(&user, id).await?;
    Ok(Json(DetailResponse::new("Article pinned.")))
}

/// DELETE /articles/:id/pin/ 和 /articles/:id/unpin/
pub async fn unpin(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Pin")?;
    app_state.engagement_service.unpin(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /articles/:id/archive/
pub async fn archive_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>> {
    let id = parse_id(&id, "Article")?;
    app_state.engagement_service.archive(&user, id).await?;
    Ok(Json(DetailResponse::new("Article archived.")))
}

/// DELETE /articles/:id/archive/
pub async fn unarchive_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Archive")?;
    app_state.engagement_service.unarchive(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 举报；触发阈值时返回 200 和下架提示
/// POST /articles/:id/report/
pub async fn report_article(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DetailResponse>)> {
    let id = parse_id(&id, "Article")?;
    let outcome = app_state.moderation_service.report_article(&user, id).await?;

    let response = match outcome {
        ReportOutcome::Removed { .. } => (
            StatusCode::OK,
            Json(DetailResponse::new("Article removed due to multiple reports.")),
        ),
        _ => (StatusCode::CREATED, Json(DetailResponse::new("Report submitted."))),
    };
    Ok(response)
}

/// POST /articles/:id/comments/
pub async fn create_comment(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    let id = parse_id(&id, "Article")?;
    let comment = app_state.comment_service.create_comment(&user, id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /articles/comments/:id/
pub async fn update_comment(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>> {
    let id = parse_id(&id, "Comment")?;
    let comment = app_state.comment_service.update_comment(&user, id, request).await?;
    Ok(Json(comment))
}

/// DELETE /articles/comments/:id/
pub async fn delete_comment(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Comment")?;
    app_state.comment_service.delete_comment(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /articles/:id/detail/comments/
pub async fn article_comments(
    State(app_state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<ArticleComments>>> {
    let id = parse_id(&id, "Article")?;
    let page = app_state.page(query.page, query.page_size);
    let thread = app_state.comment_service.article_comments(id).await?;

    let path = format!("/articles/{}/detail/comments/", id);
    Ok(Json(Paginated::from_items(vec![thread], page, &path)))
}

/// GET /articles/topics/
pub async fn list_topics(
    State(app_state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<Topic>>> {
    let page = app_state.page(query.page, query.page_size);
    let topics = app_state.topic_service.list_topics().await?;
    Ok(Json(Paginated::from_items(topics, page, "/articles/topics/")))
}

/// POST /articles/topics/:id/follow/
pub async fn follow_topic(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DetailResponse>)> {
    let id = parse_id(&id, "Topic")?;
    debug!("User {} follow topic request {}", user.id, id);

    let response = match app_state.follow_service.follow_topic(&user, id).await? {
        FollowOutcome::Followed => (
            StatusCode::CREATED,
            Json(DetailResponse::new("You are now following this topic.")),
        ),
        FollowOutcome::AlreadyFollowing => (
            StatusCode::OK,
            Json(DetailResponse::new("You are already following this topic.")),
        ),
    };
    Ok(response)
}

/// DELETE /articles/topics/:id/follow/
pub async fn unfollow_topic(
    State(app_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "Topic")?;
    app_state.follow_service.unfollow_topic(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /articles/faqs/
pub async fn list_faqs(
    State(app_state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<Faq>>> {
    let page = app_state.page(query.page, query.page_size);
    let faqs = app_state.topic_service.list_faqs().await?;
    Ok(Json(Paginated::from_items(faqs, page, "/articles/faqs/")))
}
