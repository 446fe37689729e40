use async_graphql::ErrorExtensions;
use puzzlebox_feed::FeedError;

/// Create an INTERNAL GraphQL error (hides internal details).
pub fn internal(msg: impl std::fmt::Display) -> async_graphql::Error {
    tracing::error!("internal error: {msg}");
    async_graphql::Error::new("internal error").extend_with(|_, e| {
        e.set("code", "INTERNAL");
    })
}

/// Create a BAD_REQUEST GraphQL error.
pub fn bad_request(msg: impl std::fmt::Display) -> async_graphql::Error {
    async_graphql::Error::new(format!("invalid input: {msg}")).extend_with(|_, e| {
        e.set("code", "BAD_REQUEST");
    })
}

/// Create a FEED_UNAVAILABLE GraphQL error. The client may retry.
pub fn unavailable(msg: impl std::fmt::Display) -> async_graphql::Error {
    tracing::error!("feed unavailable: {msg}");
    async_graphql::Error::new("feed unavailable, retry later").extend_with(|_, e| {
        e.set("code", "FEED_UNAVAILABLE");
        e.set("retryable", true);
    })
}

pub fn from_feed_error(err: FeedError) -> async_graphql::Error {
    match err {
        FeedError::InvalidRequest(_) | FeedError::InvalidCursor(_) => bad_request(err),
        FeedError::StoreUnavailable(_) | FeedError::StoreTimeout { .. } => unavailable(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let e = from_feed_error(FeedError::InvalidCursor("malformed".into()));
        assert!(e.message.starts_with("invalid input"));

        let e = from_feed_error(FeedError::StoreTimeout { timeout_ms: 5 });
        assert_eq!(e.message, "feed unavailable, retry later");
    }

    #[test]
    fn test_internal_hides_details() {
        let e = internal("connection string leaked");
        assert_eq!(e.message, "internal error");
    }
}
