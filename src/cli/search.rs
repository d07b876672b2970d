use anyhow::Result;
use std::sync::Arc;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Run a similarity search from the terminal.
pub async fn search(config: &EngramConfig, query: &str, k: Option<usize>) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let generator: Arc<dyn crate::fingerprint::FingerprintGenerator> = Arc::from(generator);

    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;
    if cache.is_empty() {
        println!("No entries stored yet.");
        return Ok(());
    }
    let k = k.unwrap_or(config.search.default_results);

    // The whole scan is CPU-bound (fingerprinting plus scoring).
    let fp = Arc::clone(&generator);
    let owned_query = query.to_string();
    let results = tokio::task::spawn_blocking(move || {
        crate::memory::search::search(&cache, fp.as_ref(), &owned_query, k)
    })
    .await??;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", results.len());
    for (i, result) in results.iter().enumerate() {
        let state = result
            .state_value
            .map(|s| format!(", state {s}"))
            .unwrap_or_default();
        println!(
            "  {}. {} (score: {:.4}{state})",
            i + 1,
            result.content_id,
            result.score,
        );
        println!("     {}", result.preview);
        println!("     {}", result.created_at);
        println!();
    }

    Ok(())
}
