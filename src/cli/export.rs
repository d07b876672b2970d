use anyhow::Result;
use std::path::Path;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Export the full cache with statistics as a JSON snapshot.
pub fn export(config: &EngramConfig, path: &Path) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    crate::memory::snapshot::export(&cache, path)?;

    eprintln!("Exported {} entries to {}.", cache.len(), path.display());
    Ok(())
}
