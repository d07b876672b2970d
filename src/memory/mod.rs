pub mod cache;
pub mod search;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod types;

use std::cmp::Ordering;

use self::types::SearchResult;

/// Ranking order shared by similarity and state queries: score descending,
/// newest `created_at` first on ties, `content_id` ascending as the final
/// tie-break so repeated queries return identical orderings.
pub(crate) fn compare_ranked(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.content_id.cmp(&b.content_id))
}
