use anyhow::Result;
use std::path::Path;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Merge a JSON snapshot into the live cache.
///
/// Entries are keyed by content id, so re-importing a snapshot is safe —
/// already-present ids are overwritten, never duplicated. The snapshot must
/// come from the same generator configuration as the running one.
pub fn import(config: &EngramConfig, path: &Path) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let mut cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    let (summary, stats) = crate::memory::snapshot::import(&mut cache, path)?;

    println!("Import complete:");
    println!("  Entries imported:  {}", summary.imported);
    println!("  Entries replaced:  {}", summary.replaced);
    println!("  Cache now holds:   {} entries", cache.len());
    println!("  Tagged with state: {}", stats.tagged_entries);

    Ok(())
}
