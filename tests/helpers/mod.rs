#![allow(dead_code)]

use engram::fingerprint::hashed::HashedFingerprint;
use engram::fingerprint::FingerprintGenerator;
use engram::memory::cache::MemoryCache;
use tempfile::TempDir;

/// Open a fresh cache in a temp directory with the hashed generator.
/// Keep the TempDir alive for the duration of the test.
pub fn test_cache() -> (TempDir, MemoryCache, HashedFingerprint) {
    let dir = TempDir::new().unwrap();
    let generator = HashedFingerprint::new();
    let cache = MemoryCache::open(dir.path().join("memory.json"), &generator).unwrap();
    (dir, cache, generator)
}

/// Fingerprint `text` and store it under `id`. Returns nothing — panics on
/// failure, which is what a test wants.
pub fn store_text(
    cache: &mut MemoryCache,
    generator: &HashedFingerprint,
    id: &str,
    text: &str,
    state: Option<u8>,
) {
    let fingerprint = generator.generate(text).unwrap();
    cache.store(id, fingerprint, text, state).unwrap();
}
