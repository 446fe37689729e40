//! Core types for the activity feed: the events read from the store and the
//! shaped activities handed to the presentation layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Input side: events as read from the store
// ---------------------------------------------------------------------------

/// Kind of an event in the activity stream.
///
/// Kinds this build does not know about land in `Unknown` so newer data
/// written by other services still renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Review,
    Solved,
    Post,
    ProgressUpdate,
    ListAdd,
    Unknown(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "review" => Self::Review,
            "solved" => Self::Solved,
            "post" => Self::Post,
            "progress_update" => Self::ProgressUpdate,
            "list_add" => Self::ListAdd,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Review => "review",
            Self::Solved => "solved",
            Self::Post => "post",
            Self::ProgressUpdate => "progress_update",
            Self::ListAdd => "list_add",
            Self::Unknown(raw) => raw,
        }
    }
}

/// Read-only snapshot of the user who produced an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub internal_id: Uuid,
    pub external_id: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSnapshot {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub piece_count: Option<i32>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSnapshot {
    pub rating: i32,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub status: String,
    pub solve_time_seconds: Option<i64>,
    pub difficulty_rating: Option<i32>,
    pub user_rating: Option<i32>,
    pub progress_percentage: Option<i32>,
}

/// Target references carried by an event. At most one is set for the
/// non-post kinds; `post` and `list_add` may carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTargets {
    pub puzzle_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
    pub progress_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
}

/// One immutable record of the activity stream, joined with the snapshots
/// the shaper needs. Snapshots are already normalized to single optional
/// values by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub kind: EventKind,
    pub actor_id: Uuid,
    pub targets: EventTargets,
    pub text: Option<String>,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub actor: Option<Actor>,
    pub puzzle: Option<PuzzleSnapshot>,
    pub review: Option<ReviewSnapshot>,
    pub progress: Option<ProgressSnapshot>,
}

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// Visibility restriction applied before reading events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedMode {
    All,
    Following,
    Personal,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Following => "following",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "following" => Ok(Self::Following),
            "personal" => Ok(Self::Personal),
            other => Err(format!("unknown feed mode: {other}")),
        }
    }
}

/// A feed read as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub mode: FeedMode,
    pub limit: Option<i64>,
    pub viewer_identity: Option<String>,
    pub before: Option<String>,
}

impl FeedRequest {
    pub fn new(mode: FeedMode) -> Self {
        Self {
            mode,
            limit: None,
            viewer_identity: None,
            before: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_viewer(mut self, identity: impl Into<String>) -> Self {
        self.viewer_identity = Some(identity.into());
        self
    }

    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }
}

/// Engagement kinds counted per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
    Like,
    Comment,
}

impl EngagementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
        }
    }
}

// ---------------------------------------------------------------------------
// Output side: shaped activities
// ---------------------------------------------------------------------------

/// Output type of a shaped activity. Differs from `EventKind` because some
/// kinds are rendered in another kind's lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityType {
    Review,
    Completion,
    Post,
    Follow,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Review => "review",
            Self::Completion => "completion",
            Self::Post => "post",
            Self::Follow => "follow",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityActor {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPuzzle {
    pub id: Uuid,
    pub title: String,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub piece_count: Option<i32>,
    pub difficulty: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    pub hours: i64,
    pub likes: i64,
    pub comments: i64,
}

/// Kind-specific extra fields. Absent fields are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solve_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<Uuid>,
}

/// UI-ready rendering of one event. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapedActivity {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub actor: ActivityActor,
    pub timestamp: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<ActivityPuzzle>,
    pub stats: ActivityStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ActivityMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    /// Store timestamp, kept for cursor construction.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Soft failures surfaced alongside an otherwise complete page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedWarning {
    LikesUnavailable,
    CommentsUnavailable,
}

impl FeedWarning {
    pub fn for_kind(kind: EngagementKind) -> Self {
        match kind {
            EngagementKind::Like => Self::LikesUnavailable,
            EngagementKind::Comment => Self::CommentsUnavailable,
        }
    }
}

/// One page of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub activities: Vec<ShapedActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FeedWarning>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_parse_known_and_unknown() {
        assert_eq!(EventKind::parse("solved"), EventKind::Solved);
        assert_eq!(EventKind::parse("progress_update"), EventKind::ProgressUpdate);
        let future = EventKind::parse("badge_earned");
        assert_eq!(future, EventKind::Unknown("badge_earned".to_string()));
        assert_eq!(future.as_str(), "badge_earned");
    }

    #[test]
    fn test_feed_mode_from_str() {
        assert_eq!("Following".parse::<FeedMode>(), Ok(FeedMode::Following));
        assert_eq!(" personal ".parse::<FeedMode>(), Ok(FeedMode::Personal));
        assert!("friends".parse::<FeedMode>().is_err());
    }

    #[test]
    fn test_activity_type_serializes_as_string() {
        let json = serde_json::to_value(ActivityType::Completion).unwrap();
        assert_eq!(json, serde_json::json!("completion"));
    }

    #[test]
    fn test_empty_page_omits_optional_fields() {
        let json = serde_json::to_value(FeedPage::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "activities": [] }));
    }
}
