use anyhow::Result;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Move an entry to a new content identifier, e.g. once external storage
/// has returned a permanent hash for a locally-minted id.
pub fn rekey(config: &EngramConfig, old_id: &str, new_id: &str) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let mut cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    cache.rekey(old_id, new_id)?;
    println!("Re-keyed {old_id} -> {new_id}");
    if let Some(entry) = cache.get(new_id) {
        println!("  {}", entry.preview);
    }
    Ok(())
}
