//! Configuration module for the Anime Gateway API
//!
//! Handles loading environment variables and application configuration.
//! Every variable has a default, so the service binds without any env set.

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Origin of the scraped source site
    pub source_base_url: String,
    /// Base URL of the episode-links API
    pub episode_api_url: String,
    /// Base URL of the link-resolver API
    pub resolver_api_url: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if PORT is set to something that is not a number
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            source_base_url: env::var("SOURCE_BASE_URL")
                .unwrap_or_else(|_| "https://animeheaven.me".to_string()),
            episode_api_url: env::var("EPISODE_API_URL")
                .unwrap_or_else(|_| "https://txtorg-anihx.hf.space".to_string()),
            resolver_api_url: env::var("RESOLVER_API_URL")
                .unwrap_or_else(|_| "https://txtorg-anihx.hf.space".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_has_defaults_for_everything() {
        let config = Config::from_env();
        assert!(!config.host.is_empty());
        assert!(config.source_base_url.starts_with("http"));
        assert!(config.episode_api_url.starts_with("http"));
        assert!(config.resolver_api_url.starts_with("http"));
    }
}
