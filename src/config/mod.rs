//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite database URL
    /// Use DATABASE_URL, or DATABASE_PATH for a bare file path
    pub database_url: String,

    /// JWT secret for signing and verifying login tokens
    pub jwt_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("DATABASE_PATH").map(|p| format!("sqlite://{p}")))
            .unwrap_or_else(|_| "sqlite://./data/bookshelf.db".to_string());

        // JWT_SECRET should be set explicitly in production. For development,
        // fall back to a per-process random secret.
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            let mut hasher = DefaultHasher::new();
            std::time::SystemTime::now().hash(&mut hasher);
            format!("dev-secret-{}", hasher.finish())
        });

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            jwt_secret,
        })
    }
}
