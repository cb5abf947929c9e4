use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_max_connections: u32,

    // Authentication configuration
    pub jwt_secret: String,

    // CORS configuration
    pub cors_allowed_origins: String,

    // Pagination
    pub default_page_size: usize,
    pub max_page_size: usize,

    // Engagement / moderation rules
    pub report_threshold: i64,
    pub max_claps_per_user: i32,

    // Profile validation
    pub birth_year_min: i32,
    pub birth_year_max: i32,
}

const DEV_JWT_SECRET: &str = "medium-blog-dev-secret";

/// 与 claps.count 的 CHECK 约束一致
pub const CLAP_CAP_LIMIT: i32 = 50;

fn parse_max_claps(raw: &str) -> anyhow::Result<i32> {
    let cap: i32 = raw.parse()?;
    if !(1..=CLAP_CAP_LIMIT).contains(&cap) {
        anyhow::bail!("MAX_CLAPS_PER_USER must be between 1 and {}", CLAP_CAP_LIMIT);
    }
    Ok(cap)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // 生产环境必须显式配置 JWT 密钥
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == "production" => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            Err(_) => DEV_JWT_SECRET.to_string(),
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            environment,
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "medium_blog=debug,tower_http=debug".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "memory://".to_string()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            jwt_secret,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            max_page_size: env::var("MAX_PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,

            report_threshold: env::var("REPORT_THRESHOLD")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            max_claps_per_user: parse_max_claps(
                &env::var("MAX_CLAPS_PER_USER").unwrap_or_else(|_| "50".to_string()),
            )?,

            birth_year_min: env::var("BIRTH_YEAR_MIN")
                .unwrap_or_else(|_| "1900".to_string())
                .parse()?,
            birth_year_max: env::var("BIRTH_YEAR_MAX")
                .unwrap_or_else(|_| "2025".to_string())
                .parse()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            environment: "development".to_string(),
            log_level: "medium_blog=debug,tower_http=debug".to_string(),
            database_url: "memory://".to_string(),
            database_max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cors_allowed_origins: "http://localhost:3000".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            report_threshold: 3,
            max_claps_per_user: CLAP_CAP_LIMIT,
            birth_year_min: 1900,
            birth_year_max: 2025,
        }
    }
}
