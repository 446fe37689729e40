//! FeedEngine — the read path from request to shaped page.
//!
//! resolve viewer -> plan scope -> read page -> (count likes | count comments
//! | shape) -> assemble. Stateless apart from the optional page cache; every
//! collaborator call is awaited in place, so dropping the returned future
//! cancels all in-flight reads for the request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::assembler::{assemble, EngagementCounts};
use crate::cache::{PageCache, PageKey};
use crate::cursor::FeedCursor;
use crate::engagement::{EngagementCounter, PgEngagementCounter};
use crate::error::{FeedError, FeedResult};
use crate::identity::{resolve_viewer, IdentityResolver, PgIdentityResolver, Viewer};
use crate::scope::{plan_scope, ActorFilter, PgSocialGraph, ScopePlan, SocialGraph};
use crate::shaper::shape_all;
use crate::store::{EventReader, PgEventReader};
use crate::types::{EngagementKind, Event, FeedMode, FeedPage, FeedRequest, FeedWarning};

/// Tunables for the engine. Built by the server from its config.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub default_limit: i64,
    pub max_limit: i64,
    /// Per-query timeout for the page read. Exceeding it fails the request.
    pub store_timeout: Duration,
    /// Per-query timeout for each count query. Exceeding it zeroes that kind.
    pub count_timeout: Duration,
    /// Per-query timeout for the identity and follow-edge lookups. An
    /// identity timeout is anonymous; a follow timeout fails the request.
    pub lookup_timeout: Duration,
    /// Zero disables the page cache.
    pub page_cache_ttl: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            store_timeout: Duration::from_secs(5),
            count_timeout: Duration::from_millis(1500),
            lookup_timeout: Duration::from_millis(1000),
            page_cache_ttl: Duration::ZERO,
        }
    }
}

impl FeedSettings {
    /// Effective page size for a requested limit.
    pub fn resolve_limit(&self, requested: Option<i64>) -> FeedResult<i64> {
        match requested {
            None => Ok(self.default_limit.clamp(1, self.max_limit.max(1))),
            Some(limit) if limit <= 0 => Err(FeedError::InvalidRequest(format!(
                "limit must be positive, got {limit}"
            ))),
            Some(limit) => Ok(limit.min(self.max_limit.max(1))),
        }
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct FeedEngine {
    identity: Arc<dyn IdentityResolver>,
    graph: Arc<dyn SocialGraph>,
    reader: Arc<dyn EventReader>,
    counter: Arc<dyn EngagementCounter>,
    settings: FeedSettings,
    cache: Option<Arc<PageCache>>,
    clock: Clock,
}

impl FeedEngine {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        graph: Arc<dyn SocialGraph>,
        reader: Arc<dyn EventReader>,
        counter: Arc<dyn EngagementCounter>,
        settings: FeedSettings,
    ) -> Self {
        let cache = (!settings.page_cache_ttl.is_zero())
            .then(|| Arc::new(PageCache::new(settings.page_cache_ttl)));

        Self {
            identity,
            graph,
            reader,
            counter,
            settings,
            cache,
            clock: Arc::new(Utc::now),
        }
    }

    /// Engine wired to Postgres for every collaborator.
    pub fn postgres(pool: PgPool, settings: FeedSettings) -> Self {
        Self::new(
            Arc::new(PgIdentityResolver::new(pool.clone())),
            Arc::new(PgSocialGraph::new(pool.clone())),
            Arc::new(PgEventReader::new(pool.clone())),
            Arc::new(PgEngagementCounter::new(pool)),
            settings,
        )
    }

    /// Replace the clock used for relative timestamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn page_cache(&self) -> Option<&Arc<PageCache>> {
        self.cache.as_ref()
    }

    /// Read one page of the feed.
    pub async fn feed(&self, request: FeedRequest) -> FeedResult<FeedPage> {
        let started = Instant::now();
        let limit = self.settings.resolve_limit(request.limit)?;
        let before = request
            .before
            .as_deref()
            .map(FeedCursor::decode)
            .transpose()?;

        let viewer = self.resolve(request.viewer_identity.as_deref()).await;
        let plan = self.plan(request.mode, viewer).await?;

        let filter = match plan {
            ScopePlan::Read(filter) => filter,
            ScopePlan::Empty => {
                tracing::debug!(mode = %request.mode, "scope unsatisfiable, empty page");
                return Ok(FeedPage::empty());
            }
        };

        let key = PageKey {
            mode: request.mode,
            viewer: viewer.user_id(),
            before,
            limit,
        };
        let events = self.read_page(&filter, before.as_ref(), limit, key).await?;

        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let now = (self.clock)();

        let (likes, comments, shaped) = futures::join!(
            self.count_kind(&ids, EngagementKind::Like),
            self.count_kind(&ids, EngagementKind::Comment),
            async { shape_all(&events, now) },
        );

        let counts = EngagementCounts {
            warnings: likes.1.into_iter().chain(comments.1).collect(),
            likes: likes.0,
            comments: comments.0,
        };

        let page = assemble(shaped, counts, limit);

        tracing::info!(
            mode = %request.mode,
            viewer = ?viewer.user_id(),
            limit,
            events = page.activities.len(),
            warnings = page.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feed.read"
        );

        Ok(page)
    }

    async fn resolve(&self, identity: Option<&str>) -> Viewer {
        let timeout = self.settings.lookup_timeout;
        match tokio::time::timeout(timeout, resolve_viewer(self.identity.as_ref(), identity)).await {
            Ok(viewer) => viewer,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "identity lookup timed out, treating as anonymous"
                );
                Viewer::Anonymous
            }
        }
    }

    async fn plan(&self, mode: FeedMode, viewer: Viewer) -> FeedResult<ScopePlan> {
        let timeout = self.settings.lookup_timeout;
        match tokio::time::timeout(timeout, plan_scope(mode, viewer, self.graph.as_ref())).await {
            Ok(Ok(plan)) => Ok(plan),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "follow lookup failed");
                Err(FeedError::StoreUnavailable(e))
            }
            Err(_) => {
                tracing::error!(timeout_ms = timeout.as_millis() as u64, "follow lookup timed out");
                Err(FeedError::StoreTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn read_page(
        &self,
        filter: &ActorFilter,
        before: Option<&FeedCursor>,
        limit: i64,
        key: PageKey,
    ) -> FeedResult<Arc<Vec<Event>>> {
        if let Some(cache) = &self.cache {
            if let Some(events) = cache.get(&key).await {
                tracing::debug!(mode = %key.mode, "page cache hit");
                return Ok(events);
            }
        }

        let timeout = self.settings.store_timeout;
        let mut events =
            match tokio::time::timeout(timeout, self.reader.fetch_page(filter, before, limit)).await {
                Ok(Ok(events)) => events,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "event store read failed");
                    return Err(FeedError::StoreUnavailable(e));
                }
                Err(_) => {
                    tracing::error!(timeout_ms = timeout.as_millis() as u64, "event store read timed out");
                    return Err(FeedError::StoreTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            };

        events.truncate(limit.max(0) as usize);
        let events = Arc::new(events);

        if let Some(cache) = &self.cache {
            cache.put(key, events.clone()).await;
        }

        Ok(events)
    }

    /// One batched count query. Failure or timeout yields an empty map and a
    /// warning; the page is still returned.
    async fn count_kind(
        &self,
        ids: &[Uuid],
        kind: EngagementKind,
    ) -> (HashMap<Uuid, i64>, Option<FeedWarning>) {
        let timeout = self.settings.count_timeout;
        match tokio::time::timeout(timeout, self.counter.count(ids, kind)).await {
            Ok(Ok(counts)) => (counts, None),
            Ok(Err(e)) => {
                tracing::warn!(kind = kind.as_str(), error = %e, "engagement count failed, defaulting to zero");
                (HashMap::new(), Some(FeedWarning::for_kind(kind)))
            }
            Err(_) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    timeout_ms = timeout.as_millis() as u64,
                    "engagement count timed out, defaulting to zero"
                );
                (HashMap::new(), Some(FeedWarning::for_kind(kind)))
            }
        }
    }
}
