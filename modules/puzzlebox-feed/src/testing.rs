// Test doubles for the feed engine.
//
// MemoryStore implements all four collaborator traits (IdentityResolver,
// SocialGraph, EventReader, EngagementCounter) over plain collections and
// counts every call, so tests can assert on short-circuits and batching.
//
// EventBuilder builds joined events without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cursor::FeedCursor;
use crate::engagement::EngagementCounter;
use crate::engine::{FeedEngine, FeedSettings};
use crate::identity::IdentityResolver;
use crate::scope::{ActorFilter, SocialGraph};
use crate::store::EventReader;
use crate::types::{
    Actor, EngagementKind, Event, EventKind, EventTargets, ProgressSnapshot, PuzzleSnapshot,
    ReviewSnapshot,
};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    users: HashMap<String, Uuid>,
    follows: Vec<(Uuid, Uuid)>,
    events: Vec<Event>,
    likes: HashMap<Uuid, i64>,
    comments: HashMap<Uuid, i64>,
    fail_reads: bool,
    fail_graph: bool,
    fail_kinds: Vec<EngagementKind>,
    identity_delay: Option<Duration>,
    graph_delay: Option<Duration>,
    read_delay: Option<Duration>,
    count_delay: Option<Duration>,

    pub identity_calls: AtomicUsize,
    pub graph_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub like_queries: AtomicUsize,
    pub comment_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, external_id: &str, internal_id: Uuid) -> Self {
        self.users.insert(external_id.to_string(), internal_id);
        self
    }

    pub fn with_follow(mut self, follower: Uuid, followed: Uuid) -> Self {
        self.follows.push((follower, followed));
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_likes(mut self, event_id: Uuid, count: i64) -> Self {
        self.likes.insert(event_id, count);
        self
    }

    pub fn with_comments(mut self, event_id: Uuid, count: i64) -> Self {
        self.comments.insert(event_id, count);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_graph(mut self) -> Self {
        self.fail_graph = true;
        self
    }

    pub fn failing_counts(mut self, kind: EngagementKind) -> Self {
        self.fail_kinds.push(kind);
        self
    }

    pub fn slow_identity(mut self, delay: Duration) -> Self {
        self.identity_delay = Some(delay);
        self
    }

    pub fn slow_graph(mut self, delay: Duration) -> Self {
        self.graph_delay = Some(delay);
        self
    }

    pub fn slow_reads(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn slow_counts(mut self, delay: Duration) -> Self {
        self.count_delay = Some(delay);
        self
    }

    pub fn reads(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn count_queries(&self) -> (usize, usize) {
        (
            self.like_queries.load(Ordering::SeqCst),
            self.comment_queries.load(Ordering::SeqCst),
        )
    }

    /// Engine using this store for every collaborator.
    pub fn engine(self: &Arc<Self>, settings: FeedSettings) -> FeedEngine {
        FeedEngine::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            settings,
        )
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn internal_id(&self, external_id: &str) -> Result<Option<Uuid>> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.identity_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.users.get(external_id).copied())
    }
}

#[async_trait]
impl SocialGraph for MemoryStore {
    async fn followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        self.graph_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.graph_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_graph {
            bail!("MemoryStore: follow lookup failed");
        }
        Ok(self
            .follows
            .iter()
            .filter(|(follower, _)| *follower == follower_id)
            .map(|(_, followed)| *followed)
            .collect())
    }
}

#[async_trait]
impl EventReader for MemoryStore {
    async fn fetch_page(
        &self,
        filter: &ActorFilter,
        before: Option<&FeedCursor>,
        limit: i64,
    ) -> Result<Vec<Event>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads {
            bail!("MemoryStore: connection reset");
        }

        let mut page: Vec<Event> = self
            .events
            .iter()
            .filter(|e| match filter {
                ActorFilter::Everyone => true,
                ActorFilter::Actor(id) => e.actor_id == *id,
                ActorFilter::Actors(ids) => ids.contains(&e.actor_id),
            })
            .filter(|e| match before {
                Some(c) => (e.created_at, e.id) < (c.created_at, c.id),
                None => true,
            })
            .cloned()
            .collect();

        page.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        page.truncate(limit.max(0) as usize);
        Ok(page)
    }
}

#[async_trait]
impl EngagementCounter for MemoryStore {
    async fn count(&self, event_ids: &[Uuid], kind: EngagementKind) -> Result<HashMap<Uuid, i64>> {
        let source = match kind {
            EngagementKind::Like => {
                self.like_queries.fetch_add(1, Ordering::SeqCst);
                &self.likes
            }
            EngagementKind::Comment => {
                self.comment_queries.fetch_add(1, Ordering::SeqCst);
                &self.comments
            }
        };
        if let Some(delay) = self.count_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_kinds.contains(&kind) {
            bail!("MemoryStore: {} count failed", kind.as_str());
        }

        Ok(event_ids
            .iter()
            .filter_map(|id| source.get(id).map(|n| (*id, *n)))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// EventBuilder
// ---------------------------------------------------------------------------

pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn new(kind: EventKind, actor_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            event: Event {
                id: Uuid::new_v4(),
                kind,
                actor_id,
                targets: EventTargets::default(),
                text: None,
                media_urls: vec![],
                created_at,
                actor: Some(Actor {
                    internal_id: actor_id,
                    external_id: None,
                    display_name: format!("user-{}", &actor_id.to_string()[..8]),
                    avatar_url: None,
                }),
                puzzle: None,
                review: None,
                progress: None,
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.event.id = id;
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.event.text = Some(text.to_string());
        self
    }

    pub fn media(mut self, urls: &[&str]) -> Self {
        self.event.media_urls = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn puzzle(mut self, title: &str) -> Self {
        let id = Uuid::new_v4();
        self.event.targets.puzzle_id = Some(id);
        self.event.puzzle = Some(PuzzleSnapshot {
            id,
            title: title.to_string(),
            image_url: None,
            piece_count: Some(1000),
            brand_name: Some("Ravensburger".to_string()),
        });
        self
    }

    pub fn review(mut self, rating: i32) -> Self {
        self.event.targets.review_id = Some(Uuid::new_v4());
        self.event.review = Some(ReviewSnapshot {
            rating,
            text: self.event.text.clone(),
        });
        self
    }

    pub fn progress(
        mut self,
        solve_time_seconds: Option<i64>,
        difficulty_rating: Option<i32>,
        progress_percentage: Option<i32>,
    ) -> Self {
        self.event.targets.progress_id = Some(Uuid::new_v4());
        self.event.progress = Some(ProgressSnapshot {
            status: "completed".to_string(),
            solve_time_seconds,
            difficulty_rating,
            user_rating: None,
            progress_percentage,
        });
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}
