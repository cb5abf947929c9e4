//! Engagement and moderation core of a Medium-style blogging backend.
//!
//! The HTTP surface is assembled by [`build_router`]; every handler resolves
//! the caller through [`services::auth::AuthUser`] and delegates to one of the
//! services held in [`state::AppState`].

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;

/// 构建应用路由
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // 配置 CORS
    let origins: Vec<HeaderValue> = app_state
        .config
        .cors_allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_origin(origins);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::articles::router())
        .merge(routes::users::router())
        .layer(middleware::from_fn(utils::middleware::security_headers_middleware))
        .layer(middleware::from_fn(utils::middleware::request_logging_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
