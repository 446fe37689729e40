//! Activity feed aggregation for puzzlebox.
//!
//! Reads the append-only activity stream scoped to a viewer, batches
//! engagement counts, and shapes each event into a UI-ready activity.

pub mod assembler;
pub mod cache;
pub mod cursor;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod format;
pub mod identity;
pub mod scope;
pub mod shaper;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod types;

pub use cursor::FeedCursor;
pub use engagement::{EngagementCounter, PgEngagementCounter};
pub use engine::{FeedEngine, FeedSettings};
pub use error::{FeedError, FeedResult};
pub use identity::{IdentityResolver, PgIdentityResolver, Viewer};
pub use scope::{ActorFilter, PgSocialGraph, ScopePlan, SocialGraph};
pub use store::{EventReader, PgEventReader};
pub use types::*;
