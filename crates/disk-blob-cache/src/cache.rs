//! File-based blob cache bounded by size and age
//!
//! Every entry is a single file named by the SHA-256 of its logical key plus
//! a caller-supplied extension. There is no in-memory metadata: sizes come
//! from file lengths and ages from modification times, so the cache survives
//! nothing across restarts and needs no reconciliation.
//!
//! Writes are staged to a temp file in the cache directory and renamed into
//! place, so a concurrent reader sees either the previous complete file or
//! the new one, never a truncated write. Capacity is a soft bound: two
//! concurrent stores can both pass the capacity check and transiently push
//! the total over `max_bytes`; the next store's eviction pass restores it.

use crate::types::CacheStats;
use sha2::{Digest, Sha256};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info, warn};

/// Marker embedded in staging-file names so scans and eviction skip them.
const TMP_MARKER: &str = ".tmp-";

/// A blob cache storing entries as files under a single directory
pub struct DiskCache {
    root: PathBuf,
    max_bytes: u64,
    ttl: Duration,
    /// Distinguishes concurrent staging files for the same key
    tmp_seq: AtomicU64,
}

/// One scanned cache entry; sizes and times come straight from the filesystem
struct ScannedEntry {
    name: String,
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

impl DiskCache {
    /// Create a new cache rooted at `root`, holding at most `max_bytes` of
    /// entries, each valid for `ttl_secs` after its last full write.
    pub fn new(root: PathBuf, max_bytes: u64, ttl_secs: u64) -> Self {
        Self {
            root,
            max_bytes,
            ttl: Duration::from_secs(ttl_secs),
            tmp_seq: AtomicU64::new(0),
        }
    }

    /// Initialize the cache by ensuring the root directory exists
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!(root = ?self.root, max_bytes = self.max_bytes, ttl_secs = self.ttl.as_secs(), "Cache initialized");
        Ok(())
    }

    /// Derive the on-disk file name for a logical key
    pub fn cache_key(key: &str, extension: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{}{}", hex::encode(hasher.finalize()), extension)
    }

    fn entry_path(&self, key: &str, extension: &str) -> PathBuf {
        self.root.join(Self::cache_key(key, extension))
    }

    /// Look up an entry, returning its path on a hit.
    ///
    /// An entry whose age meets or exceeds the TTL is deleted on discovery
    /// and reported as a miss. A hit has no side effects: reads never
    /// refresh the entry's age.
    pub async fn lookup(&self, key: &str, extension: &str) -> io::Result<Option<PathBuf>> {
        let path = self.entry_path(key, extension);

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "Cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        // Clock skew can put mtime in the future; treat that as freshly written
        let age = meta.modified()?.elapsed().unwrap_or_default();
        if age >= self.ttl {
            debug!(key, age_secs = age.as_secs(), ttl_secs = self.ttl.as_secs(), "Cache entry expired");
            if let Err(e) = fs::remove_file(&path).await {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = ?path, error = %e, "Failed to delete expired cache entry");
                }
            }
            return Ok(None);
        }

        debug!(key, "Cache hit");
        Ok(Some(path))
    }

    /// Store an entry, evicting oldest entries first to make room.
    ///
    /// The payload is written to a staging file and atomically renamed over
    /// the final path, which also stamps the entry's modification time.
    /// Returns the entry's path.
    pub async fn store(&self, key: &str, extension: &str, data: &[u8]) -> io::Result<PathBuf> {
        self.make_room(data.len() as u64).await;

        let file_name = Self::cache_key(key, extension);
        let tmp_name = format!(
            "{}{}{}",
            file_name,
            TMP_MARKER,
            self.tmp_seq.fetch_add(1, Ordering::Relaxed)
        );
        let tmp_path = self.root.join(tmp_name);
        let final_path = self.root.join(&file_name);

        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        debug!(key, size = data.len(), path = ?final_path, "Cached blob");
        Ok(final_path)
    }

    /// Evict entries in ascending modification-time order until `incoming`
    /// more bytes fit under `max_bytes`, or no candidates remain.
    ///
    /// A failed delete is skipped so the pass still makes forward progress;
    /// a failed directory scan skips eviction entirely rather than blocking
    /// the caller's write.
    async fn make_room(&self, incoming: u64) {
        let mut entries = match self.scan().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Cache scan failed, skipping eviction pass");
                return;
            }
        };

        let mut total: u64 = entries.iter().map(|e| e.size).sum();
        if total + incoming <= self.max_bytes {
            return;
        }

        info!(total, incoming, max_bytes = self.max_bytes, "Cache over budget, evicting oldest entries");

        // Equal mtimes fall back to name order so the pass is deterministic
        entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

        for entry in entries {
            if total + incoming <= self.max_bytes {
                break;
            }
            match fs::remove_file(&entry.path).await {
                Ok(()) => {
                    total -= entry.size;
                    debug!(path = ?entry.path, size = entry.size, "Evicted cache entry");
                }
                Err(e) => {
                    warn!(path = ?entry.path, error = %e, "Failed to evict cache entry, skipping");
                }
            }
        }

        if total + incoming > self.max_bytes {
            // Single oversized entry, or concurrent writers racing the
            // capacity check. The bound is soft; note it and move on.
            warn!(
                total,
                incoming,
                max_bytes = self.max_bytes,
                "Cache will exceed configured maximum"
            );
        }
    }

    /// Remove every entry unconditionally. Configuration is untouched.
    pub async fn purge_all(&self) -> io::Result<()> {
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            match dirent.file_type().await {
                Ok(ft) if ft.is_file() => {
                    if let Err(e) = fs::remove_file(&path).await {
                        warn!(path = ?path, error = %e, "Failed to remove cache entry during purge");
                    }
                }
                _ => {}
            }
        }
        info!("Cache cleared");
        Ok(())
    }

    /// Current cache statistics, computed by scanning the directory
    pub async fn stats(&self) -> io::Result<CacheStats> {
        let entries = self.scan().await?;
        let total_bytes: u64 = entries.iter().map(|e| e.size).sum();
        let usage = if self.max_bytes > 0 {
            total_bytes as f64 / self.max_bytes as f64
        } else {
            0.0
        };

        Ok(CacheStats {
            entries: entries.len(),
            total_bytes,
            max_bytes: self.max_bytes,
            usage,
        })
    }

    /// List current entries with their sizes and modification times.
    /// Staging files and anything that is not a regular file are skipped.
    async fn scan(&self) -> io::Result<Vec<ScannedEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(dirent) = dir.next_entry().await? {
            let name = match dirent.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if name.contains(TMP_MARKER) {
                continue;
            }

            // The entry can vanish between listing and stat under
            // concurrent eviction; treat that as not present.
            let meta = match dirent.metadata().await {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !meta.is_file() {
                continue;
            }

            entries.push(ScannedEntry {
                path: dirent.path(),
                name,
                size: meta.len(),
                modified: meta.modified()?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn new_cache(root: &std::path::Path, max_bytes: u64, ttl_secs: u64) -> DiskCache {
        let cache = DiskCache::new(root.to_path_buf(), max_bytes, ttl_secs);
        cache.init().await.unwrap();
        cache
    }

    #[test]
    fn test_cache_key_generation() {
        let key1 = DiskCache::cache_key("docs/report-1/original.pdf", ".pdf");
        let key2 = DiskCache::cache_key("docs/report-1/original.pdf", ".pdf");
        let key3 = DiskCache::cache_key("docs/report-2/original.pdf", ".pdf");

        // Same inputs produce same name, different inputs differ
        assert_eq!(key1, key2);
        assert_ne!(key1, key3);

        // SHA-256 hex stem plus the extension
        assert_eq!(key1.len(), 64 + 4);
        assert!(key1.ends_with(".pdf"));
        assert!(key1[..64].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_key_extension_changes_name() {
        let pdf = DiskCache::cache_key("docs/report-1", ".pdf");
        let png = DiskCache::cache_key("docs/report-1", ".png");
        assert_ne!(pdf, png);
        assert_eq!(pdf[..64], png[..64]);
    }

    #[tokio::test]
    async fn test_store_and_lookup_round_trip() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024 * 1024, 3600).await;

        let data = b"Hello, world!";
        let stored = cache.store("docs/a", ".pdf", data).await.unwrap();

        let found = cache.lookup("docs/a", ".pdf").await.unwrap();
        assert_eq!(found.as_deref(), Some(stored.as_path()));

        let bytes = std::fs::read(&stored).unwrap();
        assert_eq!(bytes, data);
    }

    #[tokio::test]
    async fn test_lookup_miss_on_empty_cache() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024 * 1024, 3600).await;

        let found = cache.lookup("docs/absent", ".pdf").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_ttl_zero_expires_and_deletes_on_lookup() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024 * 1024, 0).await;

        let path = cache.store("docs/a", ".pdf", b"payload").await.unwrap();
        assert!(path.exists());

        // Any age satisfies age >= 0, so the entry is expired immediately
        let found = cache.lookup("docs/a", ".pdf").await.unwrap();
        assert!(found.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fresh_entry_is_a_hit() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024 * 1024, 3600).await;

        cache.store("docs/a", ".pdf", b"payload").await.unwrap();
        assert!(cache.lookup("docs/a", ".pdf").await.unwrap().is_some());
        // A second read is still a hit; reads do not consume or refresh
        assert!(cache.lookup("docs/a", ".pdf").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_no_eviction_while_under_budget() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 20, 3600).await;

        cache.store("a", "", b"0123456789").await.unwrap();
        cache.store("b", "", b"abcdefghij").await.unwrap();

        assert!(cache.lookup("a", "").await.unwrap().is_some());
        assert!(cache.lookup("b", "").await.unwrap().is_some());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.total_bytes, 20);
    }

    #[tokio::test]
    async fn test_oldest_entry_evicted_first() {
        let dir = tempdir().unwrap();
        // Scaled version of the 10MB/6MB/5MB scenario
        let cache = new_cache(dir.path(), 10, 3600).await;

        cache.store("a", "", b"sixsix").await.unwrap(); // 6 bytes
        // Distinct mtimes even on coarse-grained filesystems
        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache.store("b", "", b"five5").await.unwrap(); // 5 bytes

        assert!(cache.lookup("a", "").await.unwrap().is_none());
        assert!(cache.lookup("b", "").await.unwrap().is_some());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_bytes, 5);
    }

    #[tokio::test]
    async fn test_resident_set_is_most_recent_suffix() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 10, 3600).await;

        cache.store("a", "", b"fourA").await.unwrap(); // 5 bytes
        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache.store("b", "", b"fourB").await.unwrap(); // 5 bytes
        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache.store("c", "", b"fourC").await.unwrap(); // 5 bytes, evicts "a"

        assert!(cache.lookup("a", "").await.unwrap().is_none());
        assert!(cache.lookup("b", "").await.unwrap().is_some());
        assert!(cache.lookup("c", "").await.unwrap().is_some());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_bytes, 10);
    }

    #[tokio::test]
    async fn test_oversized_entry_is_admitted() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 4, 3600).await;

        // Larger than the whole budget: admitted alone, bound is soft
        cache.store("big", "", b"0123456789").await.unwrap();

        assert!(cache.lookup("big", "").await.unwrap().is_some());
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_bytes, 10);
        assert!(stats.usage > 1.0);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024, 3600).await;

        cache.store("a", ".png", b"old contents").await.unwrap();
        let path = cache.store("a", ".png", b"new").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_bytes, 3);
    }

    #[tokio::test]
    async fn test_purge_all_then_stats_reports_empty() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024, 3600).await;

        cache.store("a", ".pdf", b"payload").await.unwrap();
        cache.store("b", ".png", b"payload").await.unwrap();

        cache.purge_all().await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_bytes, 0);

        assert!(cache.lookup("a", ".pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_staging_files_invisible_to_stats() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 1024, 3600).await;

        std::fs::write(dir.path().join("deadbeef.png.tmp-7"), b"half written").unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[tokio::test]
    async fn test_stats_usage_fraction() {
        let dir = tempdir().unwrap();
        let cache = new_cache(dir.path(), 20, 3600).await;

        cache.store("a", "", b"0123456789").await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.max_bytes, 20);
        assert!((stats.usage - 0.5).abs() < f64::EPSILON);
    }
}
