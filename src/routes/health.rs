use crate::{error::Result, models::response::DetailResponse, state::AppState};
use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health/", get(health_check))
}

/// GET /health/
pub async fn health_check(State(app_state): State<Arc<AppState>>) -> Result<Json<DetailResponse>> {
    app_state.db.verify_connection().await?;
    Ok(Json(DetailResponse::new("Healthy")))
}
