//! Short-TTL in-process cache for event pages.
//!
//! Only the reader's output is cached. Engagement counts are always read
//! fresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cursor::FeedCursor;
use crate::types::{Event, FeedMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub mode: FeedMode,
    pub viewer: Option<Uuid>,
    pub before: Option<FeedCursor>,
    pub limit: i64,
}

struct Entry {
    stored_at: Instant,
    events: Arc<Vec<Event>>,
}

pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<PageKey, Entry>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &PageKey) -> Option<Arc<Vec<Event>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.events.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict under the write lock.
        self.entries.write().await.remove(key);
        None
    }

    pub async fn put(&self, key: PageKey, events: Arc<Vec<Event>>) {
        self.entries.write().await.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                events,
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
