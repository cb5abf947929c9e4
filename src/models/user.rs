use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub birth_year: Option<i32>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub birth_year: Option<i32>,
    pub avatar: Option<String>,
    pub is_active: bool,
}

/// 文章、评论、关注列表中展示的作者信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

impl From<&User> for AuthorInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

impl AuthorInfo {
    /// Placeholder used when the author row has disappeared underneath an article.
    pub fn deleted(id: i64) -> Self {
        Self {
            id,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(length(max = 150))]
    pub middle_name: Option<String>,

    /// Empty string clears the address; anything else must be a valid email.
    #[validate(length(max = 254))]
    pub email: Option<String>,

    pub birth_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub birth_year: Option<i32>,
    pub avatar: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            middle_name: user.middle_name,
            birth_year: user.birth_year,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularAuthor {
    #[serde(flatten)]
    pub author: AuthorInfo,
    pub total_reads: i64,
}
