use anyhow::Result;
use std::sync::Arc;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;

/// Fingerprint a new reflection and store it in the cache.
///
/// When no id is given, a UUID v7 is minted as the local content id; the
/// caller can later move the entry to a permanent identifier with
/// `engram rekey`.
pub async fn store(
    config: &EngramConfig,
    text: &str,
    state: Option<u8>,
    id: Option<String>,
) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let generator: Arc<dyn crate::fingerprint::FingerprintGenerator> = Arc::from(generator);

    let mut cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    // Fingerprinting may be model inference — keep it off the async runtime.
    let fp = Arc::clone(&generator);
    let owned_text = text.to_string();
    let fingerprint =
        tokio::task::spawn_blocking(move || fp.generate(&owned_text)).await??;

    let content_id = id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
    cache.store(&content_id, fingerprint, text, state)?;

    match state {
        Some(value) => println!("Stored {content_id} (state {value})"),
        None => println!("Stored {content_id}"),
    }
    Ok(())
}
