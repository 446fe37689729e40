//! Keyset pagination cursor: base64("created_at|id") of the last item seen.

use base64::Engine;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{FeedError, FeedResult};

/// Position in the (created_at DESC, id DESC) order. Reads continue with
/// rows strictly before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedCursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    pub fn encode(&self) -> String {
        let raw = format!("{}|{}", self.created_at.to_rfc3339(), self.id);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(cursor: &str) -> FeedResult<Self> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(cursor.trim())
            .map_err(|_| FeedError::InvalidCursor("not base64".to_string()))?;
        let s = String::from_utf8(decoded)
            .map_err(|_| FeedError::InvalidCursor("invalid encoding".to_string()))?;
        let (ts, id) = s
            .split_once('|')
            .ok_or_else(|| FeedError::InvalidCursor("malformed".to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| FeedError::InvalidCursor("invalid timestamp".to_string()))?
            .with_timezone(&Utc);
        let id = id
            .parse::<Uuid>()
            .map_err(|_| FeedError::InvalidCursor("invalid id".to_string()))?;
        Ok(Self { created_at, id })
    }
}
