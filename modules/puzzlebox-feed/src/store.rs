//! Event store reader: one bounded, ordered, joined read per page.
//!
//! The joined row comes back flat with every snapshot column nullable.
//! `RawEventRow::into_event` is the one place that turns those columns into
//! single optional snapshots; nothing downstream looks at raw rows.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::cursor::FeedCursor;
use crate::scope::ActorFilter;
use crate::types::{
    Actor, Event, EventKind, EventTargets, ProgressSnapshot, PuzzleSnapshot, ReviewSnapshot,
};

/// Reads a page of events, newest first, ties broken by id descending.
#[async_trait]
pub trait EventReader: Send + Sync {
    async fn fetch_page(
        &self,
        filter: &ActorFilter,
        before: Option<&FeedCursor>,
        limit: i64,
    ) -> Result<Vec<Event>>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgEventReader {
    pool: PgPool,
}

impl PgEventReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PAGE_SELECT: &str = r#"
SELECT e.id, e.kind, e.actor_id,
       e.target_puzzle_id, e.target_review_id, e.target_progress_id, e.target_list_id,
       e.text, e.media_urls, e.created_at,
       u.id           AS user_id,
       u.external_id  AS user_external_id,
       u.display_name AS user_display_name,
       u.avatar_url   AS user_avatar_url,
       p.id           AS puzzle_id,
       p.title        AS puzzle_title,
       p.image_url    AS puzzle_image_url,
       p.piece_count  AS puzzle_piece_count,
       b.name         AS puzzle_brand_name,
       r.id           AS review_id,
       r.rating       AS review_rating,
       r.text         AS review_text,
       pr.id          AS progress_id,
       pr.status      AS progress_status,
       pr.solve_time_seconds,
       pr.difficulty_rating,
       pr.user_rating,
       pr.progress_percentage
FROM activity_events e
LEFT JOIN users u            ON u.id = e.actor_id
LEFT JOIN reviews r          ON r.id = e.target_review_id
LEFT JOIN puzzle_progress pr ON pr.id = e.target_progress_id
LEFT JOIN puzzles p          ON p.id = COALESCE(e.target_puzzle_id, r.puzzle_id, pr.puzzle_id)
LEFT JOIN brands b           ON b.id = p.brand_id
WHERE TRUE "#;

#[async_trait]
impl EventReader for PgEventReader {
    async fn fetch_page(
        &self,
        filter: &ActorFilter,
        before: Option<&FeedCursor>,
        limit: i64,
    ) -> Result<Vec<Event>> {
        let mut qb = QueryBuilder::<Postgres>::new(PAGE_SELECT);
        push_actor_filter(&mut qb, filter);

        if let Some(cursor) = before {
            qb.push("AND (e.created_at, e.id) < (");
            qb.push_bind(cursor.created_at);
            qb.push(", ");
            qb.push_bind(cursor.id);
            qb.push(") ");
        }

        qb.push("ORDER BY e.created_at DESC, e.id DESC LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build_query_as::<RawEventRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(RawEventRow::into_event).collect())
    }
}

fn push_actor_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ActorFilter) {
    match filter {
        ActorFilter::Everyone => {}
        ActorFilter::Actor(id) => {
            qb.push("AND e.actor_id = ");
            qb.push_bind(*id);
            qb.push(" ");
        }
        ActorFilter::Actors(ids) => {
            qb.push("AND e.actor_id = ANY(");
            qb.push_bind(ids.clone());
            qb.push(") ");
        }
    }
}

/// Flat joined row as returned by `PAGE_SELECT`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawEventRow {
    pub id: Uuid,
    pub kind: String,
    pub actor_id: Uuid,
    pub target_puzzle_id: Option<Uuid>,
    pub target_review_id: Option<Uuid>,
    pub target_progress_id: Option<Uuid>,
    pub target_list_id: Option<Uuid>,
    pub text: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,

    pub user_id: Option<Uuid>,
    pub user_external_id: Option<String>,
    pub user_display_name: Option<String>,
    pub user_avatar_url: Option<String>,

    pub puzzle_id: Option<Uuid>,
    pub puzzle_title: Option<String>,
    pub puzzle_image_url: Option<String>,
    pub puzzle_piece_count: Option<i32>,
    pub puzzle_brand_name: Option<String>,

    pub review_id: Option<Uuid>,
    pub review_rating: Option<i32>,
    pub review_text: Option<String>,

    pub progress_id: Option<Uuid>,
    pub progress_status: Option<String>,
    pub solve_time_seconds: Option<i32>,
    pub difficulty_rating: Option<i32>,
    pub user_rating: Option<i32>,
    pub progress_percentage: Option<i32>,
}

impl RawEventRow {
    /// Normalize the flat row into an `Event`. A snapshot exists only when
    /// its joined primary key is present.
    pub fn into_event(self) -> Event {
        let actor = self.user_id.map(|internal_id| Actor {
            internal_id,
            external_id: self.user_external_id,
            display_name: self.user_display_name.unwrap_or_default(),
            avatar_url: self.user_avatar_url,
        });

        let puzzle = self.puzzle_id.map(|id| PuzzleSnapshot {
            id,
            title: self.puzzle_title.unwrap_or_default(),
            image_url: self.puzzle_image_url,
            piece_count: self.puzzle_piece_count,
            brand_name: self.puzzle_brand_name,
        });

        // A review row without a rating is malformed; drop the snapshot.
        let review = match (self.review_id, self.review_rating) {
            (Some(_), Some(rating)) => Some(ReviewSnapshot {
                rating,
                text: self.review_text,
            }),
            _ => None,
        };

        let progress = self.progress_id.map(|_| ProgressSnapshot {
            status: self.progress_status.unwrap_or_default(),
            solve_time_seconds: self.solve_time_seconds.map(i64::from),
            difficulty_rating: self.difficulty_rating,
            user_rating: self.user_rating,
            progress_percentage: self.progress_percentage,
        });

        Event {
            id: self.id,
            kind: EventKind::parse(&self.kind),
            actor_id: self.actor_id,
            targets: EventTargets {
                puzzle_id: self.target_puzzle_id,
                review_id: self.target_review_id,
                progress_id: self.target_progress_id,
                list_id: self.target_list_id,
            },
            text: self.text,
            media_urls: self.media_urls.unwrap_or_default(),
            created_at: self.created_at,
            actor,
            puzzle,
            review,
            progress,
        }
    }
}
