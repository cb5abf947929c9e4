use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::User,
    services::Database,
    state::AppState,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    RequestPartsExt, TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AuthService {
    config: Config,
    db: Arc<Database>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

impl AuthService {
    pub async fn new(config: &Config, db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            db,
        })
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("JWT verification failed: {}", e);
                Err(AppError::unauthorized("Given token not valid for any token type"))
            }
        }
    }

    /// 签发访问令牌。正式环境的令牌由外部认证服务签发，这里供本地调试和测试使用。
    pub fn issue_token(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    /// 令牌 -> 活跃用户
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_jwt(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Token contained no recognizable user identification"))?;

        match self.db.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::unauthorized("User is inactive")),
            None => Err(AppError::unauthorized("User not found")),
        }
    }
}

/// 已认证的请求用户，作为请求级上下文显式传给各个服务
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        // 从请求头中提取 Authorization
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::unauthorized("Authentication credentials were not provided."))?;

        let user = state.auth_service.authenticate(bearer.token()).await?;
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;

    async fn service() -> (AuthService, Arc<Database>) {
        let db = Arc::new(Database::memory());
        let service = AuthService::new(&Config::default(), db.clone()).await.unwrap();
        (service, db)
    }

    #[tokio::test]
    async fn test_issued_token_authenticates_active_user() {
        let (auth, db) = service().await;
        let user = db
            .insert_user(NewUser {
                username: "reader".into(),
                is_active: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let token = auth.issue_token(user.id, Duration::minutes(5)).unwrap();
        let resolved = auth.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_inactive_user_is_rejected() {
        let (auth, db) = service().await;
        let user = db
            .insert_user(NewUser {
                username: "ghost".into(),
                is_active: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let token = auth.issue_token(user.id, Duration::minutes(5)).unwrap();
        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let (auth, _) = service().await;
        assert!(auth.verify_jwt("not-a-jwt").is_err());
    }
}
