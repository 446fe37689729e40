//! Engagement counts: one batched aggregate query per kind, never one per
//! event.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::EngagementKind;

/// Subject kind stored on likes/comments that point at feed events.
pub const ACTIVITY_SUBJECT: &str = "activity";

#[async_trait]
pub trait EngagementCounter: Send + Sync {
    /// Counts per event id. Ids with no engagement may be absent.
    async fn count(&self, event_ids: &[Uuid], kind: EngagementKind) -> Result<HashMap<Uuid, i64>>;
}

#[derive(Clone)]
pub struct PgEngagementCounter {
    pool: PgPool,
}

impl PgEngagementCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementCounter for PgEngagementCounter {
    async fn count(&self, event_ids: &[Uuid], kind: EngagementKind) -> Result<HashMap<Uuid, i64>> {
        let sql = match kind {
            EngagementKind::Like => {
                r#"SELECT subject_id, COUNT(*) FROM likes
                   WHERE subject_kind = $1 AND subject_id = ANY($2)
                   GROUP BY subject_id"#
            }
            EngagementKind::Comment => {
                r#"SELECT subject_id, COUNT(*) FROM comments
                   WHERE subject_kind = $1 AND subject_id = ANY($2)
                   GROUP BY subject_id"#
            }
        };

        let rows = sqlx::query_as::<_, (Uuid, i64)>(sql)
            .bind(ACTIVITY_SUBJECT)
            .bind(event_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
