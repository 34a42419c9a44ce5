//! Vitrine media pipeline server.
//!
//! Main entry point for the upload endpoint. Missing storage credentials
//! are fatal here, at startup - never a per-request condition.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_api::{AppState, create_router};
use vitrine_core::asset::MediaService;
use vitrine_core::storage::{ObjectStore, StorageConfig, StorageProvider};
use vitrine_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration - a missing storage credential fails right here.
    let config = AppConfig::load().context("failed to load configuration")?;

    // Build the object store client
    let provider = StorageProvider::r2(
        &config.storage.account_id,
        config.storage.bucket.clone(),
        config.storage.access_key_id.clone(),
        config.storage.secret_access_key.clone(),
    );
    let storage_config = StorageConfig::new(provider, config.storage.public_domain.clone());
    let store = ObjectStore::from_config(storage_config)
        .context("failed to initialize object store client")?;
    info!(
        provider = store.provider_name(),
        bucket = %config.storage.bucket,
        public_domain = %config.storage.public_domain,
        "Object store configured"
    );

    // Create application state
    let state = AppState {
        media: Arc::new(MediaService::new(Arc::new(store))),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
