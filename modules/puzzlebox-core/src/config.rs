use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,
    pub db_max_connections: u32,

    // Server
    pub port: u16,

    // Auth
    pub jwt_secret: Option<String>,
    pub jwt_issuer: String,

    // Feed
    pub feed_default_limit: i64,
    pub feed_max_limit: i64,
    pub feed_store_timeout_ms: u64,
    pub feed_count_timeout_ms: u64,
    pub feed_lookup_timeout_ms: u64,
    pub feed_page_cache_ttl_secs: u64,

    // CORS
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Numeric values that
    /// fail to parse fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parsed = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL is required")?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", "20").parse().unwrap_or(20),
            port: parsed("PORT", "9080").parse().unwrap_or(9080),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            jwt_issuer: parsed("JWT_ISSUER", "puzzlebox"),
            feed_default_limit: parsed("FEED_DEFAULT_LIMIT", "20").parse().unwrap_or(20),
            feed_max_limit: parsed("FEED_MAX_LIMIT", "100").parse().unwrap_or(100),
            feed_store_timeout_ms: parsed("FEED_STORE_TIMEOUT_MS", "5000")
                .parse()
                .unwrap_or(5000),
            feed_count_timeout_ms: parsed("FEED_COUNT_TIMEOUT_MS", "1500")
                .parse()
                .unwrap_or(1500),
            feed_lookup_timeout_ms: parsed("FEED_LOOKUP_TIMEOUT_MS", "1000")
                .parse()
                .unwrap_or(1000),
            feed_page_cache_ttl_secs: parsed("FEED_PAGE_CACHE_TTL_SECS", "0")
                .parse()
                .unwrap_or(0),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap();
        assert_eq!(config.port, 9080);
        assert_eq!(config.feed_default_limit, 20);
        assert_eq!(config.feed_max_limit, 100);
        assert_eq!(config.feed_page_cache_ttl_secs, 0);
        assert_eq!(config.feed_lookup_timeout_ms, 1000);
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_issuer, "puzzlebox");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "not-a-port"),
            ("FEED_COUNT_TIMEOUT_MS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9080);
        assert_eq!(config.feed_count_timeout_ms, 1500);
    }

    #[test]
    fn test_allowed_origins_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,,"),
            ("JWT_SECRET", ""),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.jwt_secret.is_none());
    }
}
