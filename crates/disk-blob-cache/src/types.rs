//! Cache types

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of cache occupancy, computed by scanning the
/// cache directory at the moment of the call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub max_bytes: u64,
    /// `total_bytes / max_bytes`; may exceed 1.0 while an oversized entry
    /// is resident.
    pub usage: f64,
}
