pub mod graphql;
pub mod routes;

use std::time::Duration;

use puzzlebox_core::AppConfig;
use puzzlebox_feed::FeedSettings;

/// Feed engine settings derived from the environment config.
pub fn feed_settings(config: &AppConfig) -> FeedSettings {
    FeedSettings {
        default_limit: config.feed_default_limit,
        max_limit: config.feed_max_limit,
        store_timeout: Duration::from_millis(config.feed_store_timeout_ms),
        count_timeout: Duration::from_millis(config.feed_count_timeout_ms),
        lookup_timeout: Duration::from_millis(config.feed_lookup_timeout_ms),
        page_cache_ttl: Duration::from_secs(config.feed_page_cache_ttl_secs),
    }
}
