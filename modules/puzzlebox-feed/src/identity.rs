//! Maps the opaque identity from the auth provider to an internal user id.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Lookup from an external identity to an internal user id.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn internal_id(&self, external_id: &str) -> Result<Option<Uuid>>;
}

/// Who is looking at the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewer {
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }
}

/// Resolve the viewer for a request. An identity that is absent, blank,
/// not yet provisioned, or whose lookup fails is anonymous.
pub async fn resolve_viewer(resolver: &dyn IdentityResolver, identity: Option<&str>) -> Viewer {
    let Some(identity) = identity.map(str::trim).filter(|s| !s.is_empty()) else {
        return Viewer::Anonymous;
    };

    match resolver.internal_id(identity).await {
        Ok(Some(id)) => Viewer::User(id),
        Ok(None) => {
            tracing::debug!("identity not provisioned, treating as anonymous");
            Viewer::Anonymous
        }
        Err(e) => {
            tracing::warn!(error = %e, "identity lookup failed, treating as anonymous");
            Viewer::Anonymous
        }
    }
}

/// Resolves identities against the `users.external_id` column.
#[derive(Clone)]
pub struct PgIdentityResolver {
    pool: PgPool,
}

impl PgIdentityResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn internal_id(&self, external_id: &str) -> Result<Option<Uuid>> {
        let row = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, Uuid>);

    #[async_trait]
    impl IdentityResolver for MapResolver {
        async fn internal_id(&self, external_id: &str) -> Result<Option<Uuid>> {
            Ok(self.0.get(external_id).copied())
        }
    }

    struct BrokenResolver;

    #[async_trait]
    impl IdentityResolver for BrokenResolver {
        async fn internal_id(&self, _external_id: &str) -> Result<Option<Uuid>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_known_identity_resolves() {
        let id = Uuid::new_v4();
        let resolver = MapResolver(HashMap::from([("user_1".to_string(), id)]));
        assert_eq!(resolve_viewer(&resolver, Some("user_1")).await, Viewer::User(id));
    }

    #[tokio::test]
    async fn test_absent_blank_and_unknown_are_anonymous() {
        let resolver = MapResolver(HashMap::new());
        assert_eq!(resolve_viewer(&resolver, None).await, Viewer::Anonymous);
        assert_eq!(resolve_viewer(&resolver, Some("  ")).await, Viewer::Anonymous);
        assert_eq!(resolve_viewer(&resolver, Some("user_2")).await, Viewer::Anonymous);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_anonymous() {
        assert_eq!(
            resolve_viewer(&BrokenResolver, Some("user_1")).await,
            Viewer::Anonymous
        );
    }
}
