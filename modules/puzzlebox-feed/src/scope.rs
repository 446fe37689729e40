//! Scope planning: turns a feed mode and viewer into an actor filter, or
//! decides up front that the page is empty.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::Viewer;
use crate::types::FeedMode;

/// Follow-edge lookups.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Ids the follower follows. May contain duplicates or the follower
    /// itself; callers dedupe.
    async fn followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>>;
}

/// Actor restriction applied to the event read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActorFilter {
    Everyone,
    Actor(Uuid),
    /// Never empty; an empty set is planned as `ScopePlan::Empty`.
    Actors(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePlan {
    Read(ActorFilter),
    /// The scope cannot contain any event. Skip the store entirely.
    Empty,
}

/// Plan the scope for `mode`. The social graph is only consulted for
/// `following` with a known viewer.
pub async fn plan_scope(mode: FeedMode, viewer: Viewer, graph: &dyn SocialGraph) -> Result<ScopePlan> {
    let plan = match (mode, viewer) {
        (FeedMode::All, _) => ScopePlan::Read(ActorFilter::Everyone),
        (FeedMode::Personal, Viewer::User(id)) => ScopePlan::Read(ActorFilter::Actor(id)),
        (FeedMode::Personal, Viewer::Anonymous) => ScopePlan::Empty,
        (FeedMode::Following, Viewer::Anonymous) => ScopePlan::Empty,
        (FeedMode::Following, Viewer::User(id)) => {
            let followed: BTreeSet<Uuid> = graph.followed_ids(id).await?.into_iter().collect();
            if followed.is_empty() {
                ScopePlan::Empty
            } else {
                ScopePlan::Read(ActorFilter::Actors(followed.into_iter().collect()))
            }
        }
    };

    Ok(plan)
}

/// Follow edges from the `follows` table.
#[derive(Clone)]
pub struct PgSocialGraph {
    pool: PgPool,
}

impl PgSocialGraph {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraph for PgSocialGraph {
    async fn followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query_as::<_, (Uuid,)>(
            "SELECT DISTINCT followed_id FROM follows WHERE follower_id = $1",
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
