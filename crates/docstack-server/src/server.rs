//! HTTP server wiring for the document backend
//!
//! Routes: /health, PDF upload and Dify processing under /api, plus the
//! cache administrative surface (file serving, stats, purge).

use crate::routes;
use crate::state::SharedState;
use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use disk_blob_cache::CacheStats;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pdf/upload", post(routes::documents::upload_pdf))
        .route(
            "/api/dify/process-document",
            post(routes::documents::process_document),
        )
        .route("/api/files/{*key}", get(routes::files::get_file))
        .route("/api/cache/stats", get(routes::files::cache_stats))
        .route("/api/cache", delete(routes::files::purge_cache))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let (status, cache) = match state.cache.stats().await {
        Ok(cache) => ("ok", cache),
        Err(e) => {
            error!(error = %e, "Cache scan failed during health check");
            ("degraded", CacheStats::default())
        }
    };
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: status.to_string(),
        uptime_secs,
        cache,
    })
}
