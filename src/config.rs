// src/config.rs

use dotenvy::dotenv;
use std::env;
use url::Url;

/// Cap applied to popularity rankings and recommendation lists.
pub const POPULAR_TOPIC_LIMIT: i64 = 5;
pub const RECOMMENDATION_LIMIT: i64 = 5;

/// Question-count bounds for generated quizzes.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let openai_api_key = env::var("OPENAI_API_KEY").ok();

        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        Url::parse(&openai_base_url).expect("OPENAI_BASE_URL must be a valid URL");

        let openai_model = env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            port,
            rust_log,
            openai_api_key,
            openai_base_url,
            openai_model,
        }
    }
}
