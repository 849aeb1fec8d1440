//! Retrieval orchestration: cache-check, remote-fetch, cache-populate, serve

use crate::cache::DiskCache;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque failure from a remote blob source
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// A remote key-value blob store the cache is populated from.
///
/// `Ok(None)` means the store definitively does not have the object;
/// `Err` is a transient or systemic failure and is never retried here.
#[async_trait]
pub trait BlobSource: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError>;
}

/// Outcome of a successful retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Local file the caller can serve bytes from
    pub path: PathBuf,
    /// Whether the cache already held the entry
    pub from_cache: bool,
}

/// Retrieval failure taxonomy
#[derive(Debug)]
pub enum RetrieveError {
    /// Neither the cache nor the remote store has the object
    NotFound,
    /// The remote store failed; surfaced as-is, without retry
    Remote(SourceError),
    /// Local filesystem failure while reading or populating the cache
    Io(std::io::Error),
}

impl fmt::Display for RetrieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrieveError::NotFound => write!(f, "object not found"),
            RetrieveError::Remote(err) => write!(f, "remote store error: {}", err),
            RetrieveError::Io(err) => write!(f, "cache I/O error: {}", err),
        }
    }
}

impl std::error::Error for RetrieveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetrieveError::Remote(err) => Some(err.as_ref()),
            RetrieveError::Io(err) => Some(err),
            RetrieveError::NotFound => None,
        }
    }
}

impl From<std::io::Error> for RetrieveError {
    fn from(err: std::io::Error) -> Self {
        RetrieveError::Io(err)
    }
}

/// Serves logical keys from the cache, falling back to a remote source and
/// populating the cache on the way back. Holds no state of its own beyond
/// the two collaborators; safe to share and call concurrently.
pub struct Retriever {
    cache: Arc<DiskCache>,
    source: Arc<dyn BlobSource>,
}

impl Retriever {
    pub fn new(cache: Arc<DiskCache>, source: Arc<dyn BlobSource>) -> Self {
        Self { cache, source }
    }

    /// Fetch a logical key, serving from cache when possible.
    pub async fn fetch(&self, key: &str, extension: &str) -> Result<Fetched, RetrieveError> {
        if let Some(path) = self.cache.lookup(key, extension).await? {
            return Ok(Fetched {
                path,
                from_cache: true,
            });
        }

        let data = match self.source.get(key).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(key, "Object absent from remote store");
                return Err(RetrieveError::NotFound);
            }
            Err(e) => {
                warn!(key, error = %e, "Remote fetch failed");
                return Err(RetrieveError::Remote(e));
            }
        };

        let path = self.cache.store(key, extension, &data).await?;
        Ok(Fetched {
            path,
            from_cache: false,
        })
    }
}
