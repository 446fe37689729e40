pub mod auth;
pub mod error;
pub mod types;

use async_graphql::*;
use puzzlebox_feed::{FeedEngine, FeedRequest};

use auth::ViewerIdentity;
use types::{GqlFeedMode, GqlFeedPage};

#[derive(Default)]
pub struct FeedQuery;

#[Object]
impl FeedQuery {
    /// One page of the activity feed, newest first.
    async fn feed(
        &self,
        ctx: &Context<'_>,
        mode: GqlFeedMode,
        limit: Option<i32>,
        before: Option<String>,
    ) -> Result<GqlFeedPage> {
        let engine = ctx
            .data_opt::<FeedEngine>()
            .ok_or_else(|| error::internal("feed engine missing from schema data"))?;
        let identity = ctx
            .data_opt::<ViewerIdentity>()
            .cloned()
            .unwrap_or_default();

        let request = FeedRequest {
            mode: mode.into(),
            limit: limit.map(i64::from),
            viewer_identity: identity.0,
            before,
        };

        tracing::info!(mode = %request.mode, limit = ?request.limit, "graphql.feed");

        engine
            .feed(request)
            .await
            .map(GqlFeedPage::from)
            .map_err(error::from_feed_error)
    }
}

pub type AppSchema = Schema<FeedQuery, EmptyMutation, EmptySubscription>;

pub fn build_schema(engine: FeedEngine) -> AppSchema {
    Schema::build(FeedQuery, EmptyMutation, EmptySubscription)
        .data(engine)
        .limit_depth(10)
        .limit_complexity(1000)
        .finish()
}
