use std::sync::Arc;

use tagmatch_api::{
    config::Config,
    create_router,
    db::{self, Cache},
    store::PgTagStore,
    AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting tagmatch-api");

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    info!(max_connections = config.db_max_connections, "Connected to database");

    let mut state = AppState::new(Arc::new(PgTagStore::new(pool)));
    let mut cache_writer = None;

    if let Some(redis_url) = &config.redis_url {
        let client = db::create_redis_client(redis_url)?;
        let (cache, handle) = Cache::new(client);
        state = state.with_cache(cache, config.resolve_cache_ttl_secs);
        cache_writer = Some(handle);
        info!(ttl_secs = config.resolve_cache_ttl_secs, "Resolve cache enabled");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
