//! Disk-backed blob cache with TTL expiration and oldest-first eviction
//!
//! Stores opaque blobs as files under a single directory, bounded by a total
//! byte budget and a per-entry time-to-live. The filesystem is the only
//! ledger: sizes and ages are read from file metadata, so a stats snapshot
//! is always consistent with what is actually on disk.
//!
//! The [`Retriever`] wraps a cache together with a remote [`BlobSource`],
//! serving entries from disk and transparently populating the cache on miss.

mod cache;
mod retrieve;
mod types;

pub use cache::DiskCache;
pub use retrieve::{BlobSource, Fetched, Retriever, RetrieveError, SourceError};
pub use types::CacheStats;
