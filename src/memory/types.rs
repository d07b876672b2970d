//! Core record types for the memory index.

use serde::Serialize;

/// Characters of original text kept as the stored preview.
pub const PREVIEW_CHARS: usize = 200;

/// One stored reflection: fingerprint plus preview metadata.
///
/// The fingerprint length is constant across all entries of one cache; the
/// cache enforces this on store and on load. `preview` is informational and
/// never participates in scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    /// Caller-supplied unique key, replaceable via re-key.
    pub content_id: String,
    /// Raw fingerprint bytes from the active generator.
    pub fingerprint: Vec<u8>,
    /// Truncated original text, at most [`PREVIEW_CHARS`] characters.
    pub preview: String,
    /// RFC 3339 UTC timestamp, set once at first insertion.
    pub created_at: String,
    /// Mood/state tag in 0–255. Entries without one are excluded from
    /// state queries but still rank in similarity queries.
    pub state_value: Option<u8>,
}

/// A ranked hit from a similarity or state query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub content_id: String,
    pub score: f64,
    pub preview: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_value: Option<u8>,
}

/// Truncate content to `max_chars`, appending "..." if truncated.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let end = content
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(content.len());
        format!("{}...", &content[..end])
    }
}
