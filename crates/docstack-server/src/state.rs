//! Shared server state and collaborator wiring

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dify_api::DifyClient;
use disk_blob_cache::{BlobSource, DiskCache, Retriever, SourceError};
use rustfs_client::RustFsClient;
use std::sync::Arc;

/// Adapts the object-store client to the cache crate's remote-source seam
pub struct RemoteStore(pub Arc<RustFsClient>);

#[async_trait]
impl BlobSource for RemoteStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, SourceError> {
        self.0.get_object(key).await.map_err(Into::into)
    }
}

/// Shared state for the HTTP server; every collaborator is constructed once
/// in `main` and injected here.
pub struct ServerState {
    pub cache: Arc<DiskCache>,
    pub retriever: Retriever,
    pub store: Arc<RustFsClient>,
    /// Absent when no DIFY_API_KEY is configured
    pub dify: Option<DifyClient>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(
        cache: Arc<DiskCache>,
        retriever: Retriever,
        store: Arc<RustFsClient>,
        dify: Option<DifyClient>,
    ) -> Self {
        Self {
            cache,
            retriever,
            store,
            dify,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;
