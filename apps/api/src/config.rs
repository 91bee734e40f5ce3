use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The database URL and the generation API key are both optional: when either
/// is absent the service starts in a degraded mode (no persisted records, or
/// questions drawn from the static bank instead of the generation backend).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub groq_api_key: Option<String>,
    pub max_questions: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            groq_api_key: optional_env("GROQ_API_KEY"),
            max_questions: std::env::var("MAX_QUESTIONS")
                .unwrap_or_else(|_| "7".to_string())
                .parse::<u32>()
                .context("MAX_QUESTIONS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
