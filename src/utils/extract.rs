use crate::error::{AppError, Result};
use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, FromRequestParts, Query},
    http::{request::Parts, Request},
    BoxError, Json,
};
use serde::de::DeserializeOwned;

/// JSON 请求体，解析失败统一返回 400 `{"detail": ...}`
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// 查询参数，解析失败同样返回 400 `{"detail": ...}`
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// 路径里的数字 id；不是数字时按资源不存在处理
pub fn parse_id(raw: &str, resource: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| AppError::not_found(resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "Article").unwrap(), 42);
        assert!(matches!(parse_id("abc", "Article"), Err(AppError::NotFound(_))));
    }
}
