//! Docstack - document-ingestion backend
//!
//! Accepts PDF uploads, extracts first-page preview images, persists both to
//! RustFS object storage behind a bounded disk cache, and optionally runs
//! uploads through a Dify analysis chatflow.

mod config;
mod error;
mod routes;
mod server;
mod state;

use crate::config::Config;
use crate::error::Result;
use crate::server::start_server;
use crate::state::{RemoteStore, ServerState, SharedState};
use dify_api::DifyClient;
use disk_blob_cache::{DiskCache, Retriever};
use rustfs_client::RustFsClient;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("docstack_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Docstack document backend...");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Max cache size: {} MB", config.cache_max_size_mb);
    info!("Cache TTL: {} seconds", config.cache_ttl_secs);
    info!("Object store: {}", config.rustfs_endpoint);

    // Create the cache
    let cache = Arc::new(DiskCache::new(
        config.cache_dir.clone(),
        config.max_cache_bytes(),
        config.cache_ttl_secs,
    ));
    cache.init().await?;

    // Object store client; make sure the bucket exists before serving
    let store = Arc::new(RustFsClient::new(
        &config.rustfs_endpoint,
        &config.rustfs_access_key,
        &config.rustfs_secret_key,
        &config.rustfs_bucket,
        &config.rustfs_region,
    )?);
    store.ensure_bucket().await?;

    let retriever = Retriever::new(cache.clone(), Arc::new(RemoteStore(store.clone())));

    let dify = match &config.dify_api_key {
        Some(api_key) => {
            info!("Dify analysis enabled: {}", config.dify_base_url);
            Some(DifyClient::new(&config.dify_base_url, api_key))
        }
        None => {
            warn!("DIFY_API_KEY is not set; document analysis is disabled");
            None
        }
    };

    // Create shared state
    let state: SharedState = Arc::new(ServerState::new(cache, retriever, store, dify));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}
