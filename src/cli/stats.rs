use anyhow::Result;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Display cache statistics in the terminal.
pub fn stats(config: &EngramConfig) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    let response = crate::memory::stats::cache_stats(&cache);

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total entries:       {}", response.total_entries);
    println!("  Tagged with state:   {}", response.states.tagged_entries);
    println!("  Generator:           {}", cache.generator_id());
    println!();

    if response.artifact_exists {
        println!("Cache artifact:        {}", cache.path().display());
        println!("Artifact size:         {} bytes", response.artifact_size_bytes);
    } else {
        println!("Cache artifact:        (not written yet)");
    }

    if let Some(ref oldest) = response.oldest_entry {
        println!("Oldest entry:          {oldest}");
    }
    if let Some(ref newest) = response.newest_entry {
        println!("Newest entry:          {newest}");
    }

    Ok(())
}
