//! Similarity search over the cache.
//!
//! Fingerprints the query once, scores every cached entry with the
//! generator's own comparator, and keeps the top-k. The scan is O(n) per
//! query, which is fine at journal scale (thousands of entries) — a corpus
//! of library scale would need a secondary index, which this module does
//! not provide.

use tracing::debug;

use crate::error::Result;
use crate::fingerprint::FingerprintGenerator;
use crate::memory::cache::MemoryCache;
use crate::memory::types::SearchResult;

/// Rank all cached entries against `query_text` and return the best `k`.
///
/// Results are ordered score-descending with newest-first tie-breaking and
/// are identical across repeated calls on an unchanged cache. An empty
/// cache yields an empty list; `k` larger than the cache returns every
/// entry. Empty query text is the caller's error.
pub fn search(
    cache: &MemoryCache,
    generator: &dyn FingerprintGenerator,
    query_text: &str,
    k: usize,
) -> Result<Vec<SearchResult>> {
    let query_fingerprint = generator.generate(query_text)?;

    let scored: Vec<SearchResult> = cache
        .entries()
        .map(|entry| SearchResult {
            content_id: entry.content_id.clone(),
            score: generator.score(&query_fingerprint, &entry.fingerprint) as f64,
            preview: entry.preview.clone(),
            created_at: entry.created_at.clone(),
            state_value: entry.state_value,
        })
        .collect();

    let results = top_k(scored, k);
    debug!(
        returned = results.len(),
        cache_size = cache.len(),
        "similarity search complete"
    );
    Ok(results)
}

/// Keep the `k` best results in ranked order without fully sorting the
/// tail.
fn top_k(mut results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    if k == 0 {
        return Vec::new();
    }
    if k < results.len() {
        results.select_nth_unstable_by(k - 1, super::compare_ranked);
        results.truncate(k);
    }
    results.sort_by(super::compare_ranked);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::hashed::HashedFingerprint;
    use crate::memory::types::MemoryEntry;
    use tempfile::TempDir;

    fn cache_with(texts: &[(&str, &str)]) -> (TempDir, MemoryCache, HashedFingerprint) {
        let dir = TempDir::new().unwrap();
        let generator = HashedFingerprint::new();
        let mut cache = MemoryCache::open(dir.path().join("memory.json"), &generator).unwrap();
        for (id, text) in texts {
            let fp = generator.generate(text).unwrap();
            cache.store(id, fp, text, None).unwrap();
        }
        (dir, cache, generator)
    }

    #[test]
    fn empty_cache_returns_empty() {
        let (_dir, cache, generator) = cache_with(&[]);
        let results = search(&cache, &generator, "anything at all", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn empty_query_is_an_error() {
        let (_dir, cache, generator) = cache_with(&[("id-1", "some entry")]);
        assert!(search(&cache, &generator, "   ", 5).is_err());
    }

    #[test]
    fn exact_text_ranks_first() {
        let (_dir, cache, generator) = cache_with(&[
            ("id-1", "morning jog around the lake"),
            ("id-2", "difficult conversation with my manager"),
            ("id-3", "baking bread with the kids"),
        ]);

        let results = search(&cache, &generator, "morning jog around the lake", 3).unwrap();
        assert_eq!(results[0].content_id, "id-1");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn scores_are_descending() {
        let (_dir, cache, generator) = cache_with(&[
            ("id-1", "walking in the park"),
            ("id-2", "reading a novel"),
            ("id-3", "park bench lunch break"),
        ]);

        let results = search(&cache, &generator, "lunch in the park", 3).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn k_larger_than_cache_returns_all() {
        let (_dir, cache, generator) =
            cache_with(&[("id-1", "first entry"), ("id-2", "second entry")]);
        let results = search(&cache, &generator, "entry", 50).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn k_limits_results() {
        let (_dir, cache, generator) = cache_with(&[
            ("id-1", "one thing"),
            ("id-2", "another thing"),
            ("id-3", "third thing"),
        ]);
        let results = search(&cache, &generator, "thing", 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn k_zero_returns_empty() {
        let (_dir, cache, generator) = cache_with(&[("id-1", "entry")]);
        let results = search(&cache, &generator, "entry", 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn repeated_queries_are_idempotent() {
        let (_dir, cache, generator) = cache_with(&[
            ("id-1", "quiet sunday afternoon"),
            ("id-2", "sunday roast with family"),
            ("id-3", "loud construction noise"),
        ]);

        let first = search(&cache, &generator, "sunday afternoon", 3).unwrap();
        let second = search(&cache, &generator, "sunday afternoon", 3).unwrap();
        let first_ids: Vec<&str> = first.iter().map(|r| r.content_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn score_ties_break_newest_first() {
        let dir = TempDir::new().unwrap();
        let generator = HashedFingerprint::new();
        let mut cache = MemoryCache::open(dir.path().join("memory.json"), &generator).unwrap();

        // Identical text, so identical fingerprints and identical scores.
        let fp = generator.generate("same words every time").unwrap();
        for (id, created_at) in [
            ("id-old", "2026-01-01T00:00:00+00:00"),
            ("id-new", "2026-03-01T00:00:00+00:00"),
            ("id-mid", "2026-02-01T00:00:00+00:00"),
        ] {
            cache
                .insert(MemoryEntry {
                    content_id: id.to_string(),
                    fingerprint: fp.clone(),
                    preview: "same words every time".to_string(),
                    created_at: created_at.to_string(),
                    state_value: None,
                })
                .unwrap();
        }

        let results = search(&cache, &generator, "same words every time", 3).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids, vec!["id-new", "id-mid", "id-old"]);
    }
}
