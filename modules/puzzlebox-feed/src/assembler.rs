//! Feed assembler: merges engagement counts into shaped activities.

use std::collections::HashMap;

use uuid::Uuid;

use crate::cursor::FeedCursor;
use crate::types::{FeedPage, FeedWarning, ShapedActivity};

/// Count maps gathered for one page, plus any soft failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementCounts {
    pub likes: HashMap<Uuid, i64>,
    pub comments: HashMap<Uuid, i64>,
    pub warnings: Vec<FeedWarning>,
}

/// Merge counts into `activities` without reordering. Ids missing from a
/// map get 0. A next cursor is emitted only for a full page.
pub fn assemble(
    mut activities: Vec<ShapedActivity>,
    counts: EngagementCounts,
    limit: i64,
) -> FeedPage {
    for activity in &mut activities {
        activity.stats.likes = counts.likes.get(&activity.id).copied().unwrap_or(0);
        activity.stats.comments = counts.comments.get(&activity.id).copied().unwrap_or(0);
    }

    let next_cursor = match activities.last() {
        Some(last) if activities.len() as i64 >= limit => {
            Some(FeedCursor::new(last.created_at, last.id).encode())
        }
        _ => None,
    };

    FeedPage {
        activities,
        next_cursor,
        warnings: counts.warnings,
    }
}
