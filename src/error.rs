use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::article::StatusTransitionError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Error bound to a single request field, rendered as `{field: [message]}`.
    #[error("Invalid field {field}: {message}")]
    Field { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate create of a unique relation.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Validation error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Field { field, message } => {
                let mut body = HashMap::new();
                body.insert(field.clone(), vec![message.clone()]);
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string())
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AppError::ValidatorError(e) => {
                let field_errors = e
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        (
                            field.to_string(),
                            errors
                                .iter()
                                .map(|e| {
                                    e.message
                                        .as_ref()
                                        .map(|m| m.to_string())
                                        .unwrap_or_else(|| "Invalid value.".to_string())
                                })
                                .collect::<Vec<_>>(),
                        )
                    })
                    .collect::<HashMap<String, Vec<String>>>();

                return (StatusCode::BAD_REQUEST, Json(json!(field_errors))).into_response();
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("No {} matches the given query.", resource))
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::Authentication(msg.to_string())
    }

    pub fn forbidden() -> Self {
        Self::Authorization("You do not have permission to perform this action.".to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn field(field: &str, message: &str) -> Self {
        Self::Field {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<StatusTransitionError> for AppError {
    fn from(err: StatusTransitionError) -> Self {
        match err {
            StatusTransitionError::Terminal => AppError::not_found("Article"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("Article").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("dup").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized("no").into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden().into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::field("get_top_articles", "Enter a number.").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
