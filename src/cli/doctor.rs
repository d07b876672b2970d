//! CLI `doctor` command — check the cache artifact and print a health report.

use anyhow::Result;

use crate::config::EngramConfig;
use crate::error::EngramError;
use crate::memory::cache::MemoryCache;

/// Inspect the cache artifact against the active generator configuration.
pub fn doctor(config: &EngramConfig) -> Result<()> {
    let cache_path = config.resolved_cache_path();
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;

    println!("Engram Health Report");
    println!("====================");
    println!();
    println!("Cache artifact:    {}", cache_path.display());

    if !cache_path.exists() {
        println!("Status:            not found");
        println!("Store a first entry with `engram store \"...\"` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&cache_path).map(|m| m.len()).unwrap_or(0);
    println!("File size:         {}", format_bytes(file_size));
    println!();
    println!("Fingerprint generator:");
    println!("  Strategy:        {}", config.fingerprint.strategy);
    println!("  Configured:      {}", generator.identity());

    match MemoryCache::open(&cache_path, generator.as_ref()) {
        Ok(cache) => {
            println!("  Status:          OK (artifact matches)");
            println!();
            let stats = crate::memory::stats::cache_stats(&cache);
            println!("Entries:           {}", stats.total_entries);
            println!("Tagged with state: {}", stats.states.tagged_entries);
            if let Some(ref oldest) = stats.oldest_entry {
                println!("Oldest entry:      {oldest}");
            }
            if let Some(ref newest) = stats.newest_entry {
                println!("Newest entry:      {newest}");
            }
        }
        Err(EngramError::GeneratorMismatch { found, active, .. }) => {
            println!("  Stored:          {found}");
            println!("  Active:          {active}");
            println!("  WARNING: generator mismatch! Similarity scores would be meaningless.");
            println!();
            println!("Recovery steps:");
            println!("  1. Restore the config that wrote the artifact and back it up:");
            println!("     engram export backup.json");
            println!("  2. Or rebuild under the active generator:");
            println!("     engram reset, then re-store your entries");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
