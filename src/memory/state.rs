//! State index — tolerance and range lookups plus distribution statistics
//! over the 0–255 state tags.
//!
//! All three query modes are read-only views over the cache; entries
//! without a state value never appear in them. Results reuse the shared
//! ranking order so state queries are as deterministic as similarity
//! queries.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{EngramError, Result};
use crate::memory::cache::MemoryCache;
use crate::memory::types::{MemoryEntry, SearchResult};

/// The four coarse bands the 0–255 range is reported in.
const BANDS: [(&str, u8, u8); 4] = [
    ("low", 0, 63),
    ("medium-low", 64, 127),
    ("medium-high", 128, 191),
    ("high", 192, 255),
];

/// Entries whose state lies within `tolerance` of `value`, ranked by
/// closeness: score is `1 − distance/max(tolerance, 1)`, so an exact match
/// scores 1.0 and a match at the tolerance edge approaches 0.
pub fn by_state(cache: &MemoryCache, value: u8, tolerance: u16) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = cache
        .entries()
        .filter_map(|entry| {
            let state = entry.state_value?;
            let distance = (state as i32 - value as i32).unsigned_abs();
            if distance > tolerance as u32 {
                return None;
            }
            let score = 1.0 - distance as f64 / tolerance.max(1) as f64;
            Some(to_result(entry, score))
        })
        .collect();

    results.sort_by(super::compare_ranked);
    debug!(value, tolerance, matched = results.len(), "state lookup");
    results
}

/// Entries whose state lies in `[min, max]` (inclusive), scored by
/// [`midpoint_affinity`]. `min > max` is a malformed request.
pub fn by_state_range(cache: &MemoryCache, min: u8, max: u8) -> Result<Vec<SearchResult>> {
    if min > max {
        return Err(EngramError::InvalidInput(format!(
            "state range lower bound {min} exceeds upper bound {max}"
        )));
    }

    let mut results: Vec<SearchResult> = cache
        .entries()
        .filter_map(|entry| {
            let state = entry.state_value?;
            if state < min || state > max {
                return None;
            }
            Some(to_result(entry, midpoint_affinity(state, min, max)))
        })
        .collect();

    results.sort_by(super::compare_ranked);
    debug!(min, max, matched = results.len(), "state range lookup");
    Ok(results)
}

/// Scoring policy for range queries: entries in the middle of the band
/// score highest (1.0 at the midpoint, tapering to 0.0 at either edge),
/// and a single-value range scores every member 1.0.
///
/// This is an editorial bias toward "typical" entries of the queried mood
/// band, not a correctness requirement — it lives here as its own function
/// so it can be replaced without touching filtering or ordering.
pub fn midpoint_affinity(state: u8, min: u8, max: u8) -> f64 {
    let span = (max - min) as f64;
    if span == 0.0 {
        return 1.0;
    }
    let position = (state - min) as f64 / span;
    1.0 - (position - 0.5).abs() * 2.0
}

/// Frequency of one state value.
#[derive(Debug, Clone, Serialize)]
pub struct StateFrequency {
    pub state: u8,
    pub count: u64,
}

/// Count of entries within one coarse band of the 0–255 range.
#[derive(Debug, Clone, Serialize)]
pub struct BandCount {
    pub label: &'static str,
    pub lo: u8,
    pub hi: u8,
    pub count: u64,
}

/// Distribution of state values across the cache, computed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct StateStatistics {
    /// Entries carrying a state value (untagged entries are not counted).
    pub tagged_entries: u64,
    pub unique_states: u64,
    pub counts: BTreeMap<u8, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_state: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_state: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_state: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frequent: Option<StateFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub least_frequent: Option<StateFrequency>,
    pub bands: Vec<BandCount>,
}

/// Aggregate state counts, moments, and band totals over the cache.
///
/// Frequency ties resolve to the smaller state value so reports are
/// deterministic.
pub fn distribution(cache: &MemoryCache) -> StateStatistics {
    let mut counts: BTreeMap<u8, u64> = BTreeMap::new();
    for entry in cache.entries() {
        if let Some(state) = entry.state_value {
            *counts.entry(state).or_insert(0) += 1;
        }
    }

    let tagged: u64 = counts.values().sum();
    let (mean, std_dev) = if tagged > 0 {
        let sum: f64 = counts
            .iter()
            .map(|(state, count)| *state as f64 * *count as f64)
            .sum();
        let mean = sum / tagged as f64;
        let variance: f64 = counts
            .iter()
            .map(|(state, count)| (*state as f64 - mean).powi(2) * *count as f64)
            .sum::<f64>()
            / tagged as f64;
        (Some(mean), Some(variance.sqrt()))
    } else {
        (None, None)
    };

    let mut most_frequent: Option<StateFrequency> = None;
    let mut least_frequent: Option<StateFrequency> = None;
    for (&state, &count) in &counts {
        if most_frequent.as_ref().map_or(true, |m| count > m.count) {
            most_frequent = Some(StateFrequency { state, count });
        }
        if least_frequent.as_ref().map_or(true, |l| count < l.count) {
            least_frequent = Some(StateFrequency { state, count });
        }
    }

    let bands = BANDS
        .iter()
        .map(|&(label, lo, hi)| BandCount {
            label,
            lo,
            hi,
            count: counts
                .iter()
                .filter(|(&state, _)| state >= lo && state <= hi)
                .map(|(_, &count)| count)
                .sum(),
        })
        .collect();

    StateStatistics {
        tagged_entries: tagged,
        unique_states: counts.len() as u64,
        min_state: counts.keys().next().copied(),
        max_state: counts.keys().next_back().copied(),
        mean_state: mean,
        std_dev,
        most_frequent,
        least_frequent,
        counts,
        bands,
    }
}

fn to_result(entry: &MemoryEntry, score: f64) -> SearchResult {
    SearchResult {
        content_id: entry.content_id.clone(),
        score,
        preview: entry.preview.clone(),
        created_at: entry.created_at.clone(),
        state_value: entry.state_value,
    }
}
