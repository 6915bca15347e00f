//! SwapIt Feed Server
//!
//! Serves the marketplace listing feed and keeps it in step with the listing
//! service through signed listing events.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::file::{StorageBackend, StorageConfig};
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use swapit_feed_core::events::{feed_updated_channel, listing_event_channel};
use swapit_feed_core::facade::Feed;
use swapit_feed_core::processors::FeedSynchronizer;
use swapit_feed_core::source::HttpListingSource;
use swapit_feed_core::store::{FeedIndexStore, MemoryFeedIndex, PgFeedIndex};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// SwapIt listing feed server
#[derive(Parser, Debug)]
#[command(name = "swapit-feed-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./swapit-feed.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting swapit-feed-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader
        .load()
        .inspect_err(|e| tracing::error!(error = %e, path = ?args.config, "Invalid configuration"))?;
    tracing::info!(path = ?args.config, "Configuration loaded");

    let listen_addr = loaded_config.server.listen;
    let storage = loaded_config.storage.clone();
    let listing_source = Arc::new(HttpListingSource::new(&loaded_config.listing_source)?);
    let shared_config = loaded_config.into_shared();

    let (store, db_pool) = match storage.backend {
        StorageBackend::Postgres => {
            let db_pool = connect_postgres(&storage, args.migrate).await?;
            let store: Arc<dyn FeedIndexStore> = Arc::new(PgFeedIndex::new(db_pool.clone()));
            (store, Some(db_pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory feed index; contents are lost on restart");
            if args.migrate {
                tracing::warn!("--migrate has no effect with the memory backend");
            }
            let store: Arc<dyn FeedIndexStore> = Arc::new(MemoryFeedIndex::new());
            (store, None)
        }
    };

    // Event channels
    let (listing_event_tx, listing_event_rx) = listing_event_channel();
    let feed_updated_tx = feed_updated_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let synchronizer = FeedSynchronizer::new(
        store.clone(),
        listing_source.clone(),
        feed_updated_tx.clone(),
    );
    let synchronizer_handle =
        tokio::spawn(synchronizer.run(shutdown_rx.clone(), listing_event_rx));

    let feed = Feed::new(store, feed_updated_tx.clone());
    let state = AppState::new(
        feed,
        listing_event_tx,
        feed_updated_tx,
        shared_config,
        shutdown_rx,
    );

    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader, listing_source);

    let router = build_router(state);

    tracing::info!(%listen_addr, "Serving feed API");
    let result = run_server(router, listen_addr, shutdown_tx.clone()).await;

    // The server may also stop on a bind error; make sure everything else stops too.
    let _ = shutdown_tx.send(true);
    reload_notify.notify_one();

    tracing::info!("Waiting for in-flight listing events...");
    if let Err(e) = synchronizer_handle.await {
        tracing::error!(error = %e, "FeedSynchronizer task failed");
    }

    if let Some(db_pool) = db_pool {
        db_pool.close().await;
        tracing::info!("Feed index database pool closed");
    }
    tracing::info!("swapit-feed-server stopped");

    result.map_err(Into::into)
}

/// Open the pool for the feed index and optionally apply pending migrations.
async fn connect_postgres(storage: &StorageConfig, migrate: bool) -> anyhow::Result<PgPool> {
    let database_url = get_database_url().inspect_err(|e| {
        tracing::error!(error = %e, "Cannot start the postgres backend");
    })?;

    let db_pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .connect(&database_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Feed index database unreachable"))?;
    tracing::info!(
        max_connections = storage.max_connections,
        "Connected to feed index database"
    );

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Feed index migration failed"))?;
        tracing::info!("Feed index schema is up to date");
    }
    Ok(db_pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
