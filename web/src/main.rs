//! Keydrop HTTP server.
//!
//! Wires the Redis pool, the PostgreSQL ledger, and the boundary router,
//! then serves until ctrl-c or SIGTERM.

use keydrop_core::stores::{
    PostgresLinkLedger, RedisExpiryStore, RedisKeyPool, RedisRateLimiter,
};
use keydrop_web::config::{Config, DEV_ADMIN_TOKEN};
use keydrop_web::{build_router, AppState};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keydrop=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting keydrop server");

    let config = Config::from_env();
    if config.app.admin_token == DEV_ADMIN_TOKEN {
        warn!("ADMIN_TOKEN not set; using the development default");
    }

    // Ledger (PostgreSQL)
    info!("Connecting to ledger database...");
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await?;
    let ledger = PostgresLinkLedger::new(pg_pool);
    ledger.migrate().await?;
    info!("Ledger connected and migrated");

    // Pool, expiry markers and rate limiter (Redis)
    info!("Connecting to Redis...");
    let key_pool = RedisKeyPool::new(&config.redis.url).await?;
    let expiry = RedisExpiryStore::new(&config.redis.url).await?;
    let rate_limiter = RedisRateLimiter::new(&config.redis.url).await?;
    info!("Redis stores connected");

    let state = AppState::new(
        key_pool,
        ledger,
        expiry,
        rate_limiter,
        config.app.core_config(),
        config.app.base_url.clone(),
        config.app.admin_token.clone(),
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            // A broken signal handler must not trigger a shutdown.
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
