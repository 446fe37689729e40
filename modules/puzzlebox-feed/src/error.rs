//! Typed errors for feed reads.
//!
//! Only failures of the primary page read are fatal. Empty scopes, count
//! failures and unknown event kinds are handled inside the engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Request parameters out of range
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pagination cursor could not be decoded
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// The event store (or the social graph feeding the scope) failed
    #[error("feed unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    /// The page read exceeded its per-query timeout
    #[error("feed read timed out after {timeout_ms}ms")]
    StoreTimeout { timeout_ms: u64 },
}

impl FeedError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreTimeout { .. })
    }
}

/// Result type alias for feed operations.
pub type FeedResult<T> = std::result::Result<T, FeedError>;
