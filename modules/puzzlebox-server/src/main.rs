use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use puzzlebox_core::{AppConfig, ServerDeps};
use puzzlebox_feed::FeedEngine;
use puzzlebox_server::graphql::auth::jwt::JwtService;
use puzzlebox_server::{feed_settings, routes};

#[derive(Parser)]
#[command(name = "puzzlebox-server", about = "Puzzlebox activity feed server")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not run database migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting puzzlebox-server");

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let port = cli.port.unwrap_or(config.port);

    let deps = ServerDeps::connect(config).await?;

    if cli.skip_migrations {
        tracing::info!("Skipping migrations");
    } else {
        sqlx::migrate!("../../migrations").run(deps.pool()).await?;
        tracing::info!("Migrations complete");
    }

    let settings = feed_settings(&deps.config);
    tracing::info!(
        default_limit = settings.default_limit,
        max_limit = settings.max_limit,
        store_timeout_ms = settings.store_timeout.as_millis() as u64,
        count_timeout_ms = settings.count_timeout.as_millis() as u64,
        lookup_timeout_ms = settings.lookup_timeout.as_millis() as u64,
        page_cache_ttl_secs = settings.page_cache_ttl.as_secs(),
        "Feed settings"
    );

    let engine = FeedEngine::postgres(deps.pool().clone(), settings);

    // Sweep expired page-cache entries in the background.
    if let Some(cache) = engine.page_cache().cloned() {
        let every = cache.ttl().max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "page cache sweep");
                }
            }
        });
    }

    let jwt_service = deps
        .config
        .jwt_secret
        .as_ref()
        .map(|secret| JwtService::new(secret, deps.config.jwt_issuer.clone()));
    if jwt_service.is_none() {
        tracing::warn!("JWT_SECRET not set, every request is anonymous");
    }

    let app = routes::build_router(engine, jwt_service, &deps.config.allowed_origins);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Feed API listening");
    tracing::info!("GraphiQL IDE available at http://{addr}/graphql");

    axum::serve(listener, app).await?;

    Ok(())
}
