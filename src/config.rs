// src/config.rs

use std::env;
use dotenvy::dotenv;

const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Prefix every API route is mounted under, e.g. "/api".
    pub api_prefix: String,
    /// Public address of the board, shown in the welcome text when set.
    pub main_address: Option<String>,
    pub static_dir: String,
    pub bind_address: String,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://wall_of_text.db?mode=rwc".to_string());

        let api_prefix = normalize_prefix(
            &env::var("MAIN_API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string()),
        );

        let main_address = env::var("MAIN_ADDRESS").ok().filter(|a| !a.trim().is_empty());

        let static_dir = env::var("STATIC_DIR")
            .unwrap_or_else(|_| "static".to_string());

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        Self {
            database_url,
            api_prefix,
            main_address,
            static_dir,
            bind_address,
            rust_log,
            log_dir,
        }
    }
}

/// Forces a leading '/' and drops trailing ones. An empty or bare "/"
/// prefix falls back to "/api" since routes cannot be nested at the root.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_PREFIX.to_string();
    }
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::normalize_prefix;

    #[test]
    fn prefix_gets_leading_slash_only() {
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/board/api/"), "/board/api");
        assert_eq!(normalize_prefix(""), "/api");
        assert_eq!(normalize_prefix("/"), "/api");
    }
}
