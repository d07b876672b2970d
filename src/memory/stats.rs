use serde::Serialize;

use crate::memory::cache::MemoryCache;
use crate::memory::state::{self, StateStatistics};

/// Read-only snapshot of the cache's shape: entry count, artifact
/// presence/size, timestamp range, and the state distribution.
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub artifact_exists: bool,
    pub artifact_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<String>,
    pub states: StateStatistics,
}

/// Compute cache statistics. Cheap and read-only, O(n) at worst.
pub fn cache_stats(cache: &MemoryCache) -> CacheStats {
    let artifact_size_bytes = std::fs::metadata(cache.path())
        .map(|m| m.len())
        .unwrap_or(0);

    let oldest_entry = cache
        .entries()
        .map(|e| e.created_at.as_str())
        .min()
        .map(str::to_string);
    let newest_entry = cache
        .entries()
        .map(|e| e.created_at.as_str())
        .max()
        .map(str::to_string);

    CacheStats {
        total_entries: cache.len() as u64,
        artifact_exists: cache.path().exists(),
        artifact_size_bytes,
        oldest_entry,
        newest_entry,
        states: state::distribution(cache),
    }
}
