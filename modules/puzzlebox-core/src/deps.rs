use crate::config::AppConfig;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Central dependency container passed to the router and the feed engine.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub config: AppConfig,
}

impl ServerDeps {
    pub fn new(db_pool: PgPool, config: AppConfig) -> Self {
        Self { db_pool, config }
    }

    /// Open the Postgres pool described by `config`.
    pub async fn connect(config: AppConfig) -> Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        tracing::info!(
            max_connections = config.db_max_connections,
            "Connected to database"
        );

        Ok(Self::new(db_pool, config))
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }
}
