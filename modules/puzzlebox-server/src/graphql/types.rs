use async_graphql::*;
use uuid::Uuid;

use puzzlebox_feed::{
    ActivityActor, ActivityMetadata, ActivityPuzzle, ActivityStats, FeedMode, FeedPage,
    FeedWarning, ShapedActivity,
};

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "FeedMode")]
pub enum GqlFeedMode {
    All,
    Following,
    Personal,
}

impl From<GqlFeedMode> for FeedMode {
    fn from(m: GqlFeedMode) -> Self {
        match m {
            GqlFeedMode::All => FeedMode::All,
            GqlFeedMode::Following => FeedMode::Following,
            GqlFeedMode::Personal => FeedMode::Personal,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "FeedPage")]
pub struct GqlFeedPage {
    pub activities: Vec<GqlActivity>,
    pub next_cursor: Option<String>,
    pub warnings: Vec<String>,
}

impl From<FeedPage> for GqlFeedPage {
    fn from(p: FeedPage) -> Self {
        Self {
            activities: p.activities.into_iter().map(GqlActivity::from).collect(),
            next_cursor: p.next_cursor,
            warnings: p.warnings.into_iter().map(warning_code).collect(),
        }
    }
}

fn warning_code(w: FeedWarning) -> String {
    match w {
        FeedWarning::LikesUnavailable => "likes_unavailable".to_string(),
        FeedWarning::CommentsUnavailable => "comments_unavailable".to_string(),
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Activity")]
pub struct GqlActivity {
    pub id: Uuid,
    #[graphql(name = "type")]
    pub kind: String,
    pub actor: GqlActor,
    pub timestamp: String,
    pub content: String,
    pub puzzle: Option<GqlPuzzle>,
    pub stats: GqlStats,
    pub metadata: Option<GqlMetadata>,
    pub media_urls: Option<Vec<String>>,
}

impl From<ShapedActivity> for GqlActivity {
    fn from(a: ShapedActivity) -> Self {
        Self {
            id: a.id,
            kind: a.kind.as_str().to_string(),
            actor: a.actor.into(),
            timestamp: a.timestamp,
            content: a.content,
            puzzle: a.puzzle.map(Into::into),
            stats: a.stats.into(),
            metadata: a.metadata.map(Into::into),
            media_urls: a.media_urls,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "ActivityActor")]
pub struct GqlActor {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<ActivityActor> for GqlActor {
    fn from(a: ActivityActor) -> Self {
        Self {
            id: a.id,
            name: a.name,
            avatar: a.avatar,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "ActivityPuzzle")]
pub struct GqlPuzzle {
    pub id: Uuid,
    pub title: String,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub piece_count: Option<i32>,
    pub difficulty: String,
    pub rating: Option<i32>,
}

impl From<ActivityPuzzle> for GqlPuzzle {
    fn from(p: ActivityPuzzle) -> Self {
        Self {
            id: p.id,
            title: p.title,
            brand: p.brand,
            image: p.image,
            piece_count: p.piece_count,
            difficulty: p.difficulty,
            rating: p.rating,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "ActivityStats")]
pub struct GqlStats {
    pub hours: i64,
    pub likes: i64,
    pub comments: i64,
}

impl From<ActivityStats> for GqlStats {
    fn from(s: ActivityStats) -> Self {
        Self {
            hours: s.hours,
            likes: s.likes,
            comments: s.comments,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "ActivityMetadata")]
pub struct GqlMetadata {
    pub rating: Option<i32>,
    pub solve_time: Option<String>,
    pub progress: Option<i32>,
    pub status: Option<String>,
    pub user_rating: Option<i32>,
    pub difficulty_rating: Option<i32>,
    pub list_id: Option<Uuid>,
}

impl From<ActivityMetadata> for GqlMetadata {
    fn from(m: ActivityMetadata) -> Self {
        Self {
            rating: m.rating,
            solve_time: m.solve_time,
            progress: m.progress,
            status: m.status,
            user_rating: m.user_rating,
            difficulty_rating: m.difficulty_rating,
            list_id: m.list_id,
        }
    }
}
