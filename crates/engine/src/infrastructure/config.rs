//! Application configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database location for the story store
    pub database_path: String,

    /// HTTP server port
    pub server_port: u16,

    /// CORS allowed origins (comma-separated, or "*" for any)
    pub cors_allowed_origins: Vec<String>,

    /// Idle window after which a session is reclaimed
    pub session_timeout: Duration,

    /// How long store reads are served from cache
    pub store_cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_path: env::var("DATABASE_PATH")
                .context("DATABASE_PATH environment variable is required")?,

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            session_timeout: Duration::from_secs(
                60 * env::var("SESSION_TIMEOUT_MINUTES")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse::<u64>()
                    .context("SESSION_TIMEOUT_MINUTES must be a number")?,
            ),

            store_cache_ttl: Duration::from_secs(
                env::var("STORE_CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse::<u64>()
                    .context("STORE_CACHE_TTL_SECONDS must be a number")?,
            ),
        })
    }

    /// Fixed settings for in-process tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            server_port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            session_timeout: Duration::from_secs(20 * 60),
            store_cache_ttl: Duration::from_secs(5 * 60),
        }
    }
}
