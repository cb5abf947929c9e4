use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::{ProfileResponse, UpdateProfileRequest, User},
    services::Database,
    utils::validation::{validate_birth_year, validate_optional_email},
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    birth_years: (i32, i32),
}

impl UserService {
    pub async fn new(db: Arc<Database>, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            birth_years: (config.birth_year_min, config.birth_year_max),
        })
    }

    pub fn profile(&self, user: &User) -> ProfileResponse {
        ProfileResponse::from(user.clone())
    }

    pub async fn update_profile(&self, user: &User, request: UpdateProfileRequest) -> Result<ProfileResponse> {
        debug!("Updating profile for user: {}", user.id);

        request.validate()?;

        let mut updated = user.clone();
        if let Some(first_name) = request.first_name {
            updated.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            updated.last_name = last_name;
        }
        if let Some(middle_name) = request.middle_name {
            updated.middle_name = middle_name;
        }
        if let Some(email) = request.email {
            let email = email.trim().to_string();
            validate_optional_email(&email)?;
            updated.email = email;
        }
        if let Some(year) = request.birth_year {
            let (min, max) = self.birth_years;
            validate_birth_year(year, min, max)?;
            updated.birth_year = Some(year);
        }

        let saved = self
            .db
            .update_user(&updated)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        info!("Profile updated for user {}", user.id);
        Ok(ProfileResponse::from(saved))
    }
}
