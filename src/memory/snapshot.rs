//! Snapshot export and import for backup and inspection.
//!
//! An export is one JSON document: generator identity, every entry with a
//! hex-encoded fingerprint, and the state distribution computed from the
//! live cache at export time. Import merges a snapshot back through the
//! cache's validating insert — re-importing the same snapshot overwrites
//! by id and never duplicates — and recomputes statistics from the merged
//! cache rather than trusting the document's embedded numbers.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngramError, Result};
use crate::memory::cache::{write_atomic, MemoryCache};
use crate::memory::state::{self, StateStatistics};
use crate::memory::types::MemoryEntry;

/// Written by [`export`].
#[derive(Debug, Serialize)]
struct ExportDocument {
    generator: String,
    fingerprint_len: usize,
    exported_at: String,
    statistics: StateStatistics,
    entries: Vec<SnapshotEntry>,
}

/// Read by [`import`] — embedded statistics and timestamps in the document
/// are deliberately ignored.
#[derive(Debug, Deserialize)]
struct ImportDocument {
    generator: String,
    fingerprint_len: usize,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    content_id: String,
    fingerprint: String,
    preview: String,
    created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_value: Option<u8>,
}

/// Counts returned by [`import`].
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: u64,
    pub replaced: u64,
}

/// Serialize the full cache plus its state distribution to `path`.
pub fn export(cache: &MemoryCache, path: &Path) -> Result<()> {
    let mut entries: Vec<SnapshotEntry> = cache
        .entries()
        .map(|entry| SnapshotEntry {
            content_id: entry.content_id.clone(),
            fingerprint: hex::encode(&entry.fingerprint),
            preview: entry.preview.clone(),
            created_at: entry.created_at.clone(),
            state_value: entry.state_value,
        })
        .collect();
    entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let document = ExportDocument {
        generator: cache.generator_id().to_string(),
        fingerprint_len: cache.fingerprint_len(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        statistics: state::distribution(cache),
        entries,
    };

    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| EngramError::persistence(path, e))?;
    write_atomic(path, &json)?;

    info!(count = cache.len(), path = %path.display(), "snapshot exported");
    Ok(())
}

/// Merge a snapshot into the live cache, then flush once.
///
/// Rejects snapshots from a different generator configuration. Idempotent:
/// entries are keyed by content id, so importing the same snapshot twice
/// leaves the cache unchanged. Returns fresh statistics computed from the
/// merged cache along with the merge counts.
pub fn import(cache: &mut MemoryCache, path: &Path) -> Result<(ImportSummary, StateStatistics)> {
    let raw =
        std::fs::read_to_string(path).map_err(|e| EngramError::persistence(path, e))?;
    let document: ImportDocument =
        serde_json::from_str(&raw).map_err(|e| EngramError::persistence(path, e))?;

    if document.generator != cache.generator_id()
        || document.fingerprint_len != cache.fingerprint_len()
    {
        return Err(EngramError::GeneratorMismatch {
            path: path.to_path_buf(),
            found: document.generator,
            active: cache.generator_id().to_string(),
        });
    }

    let mut summary = ImportSummary {
        imported: 0,
        replaced: 0,
    };
    for entry in document.entries {
        let fingerprint = hex::decode(&entry.fingerprint).map_err(|e| {
            EngramError::InvalidInput(format!(
                "snapshot entry {} has an undecodable fingerprint: {e}",
                entry.content_id
            ))
        })?;
        let replaced = cache.insert(MemoryEntry {
            content_id: entry.content_id,
            fingerprint,
            preview: entry.preview,
            created_at: entry.created_at,
            state_value: entry.state_value,
        })?;
        if replaced {
            summary.replaced += 1;
        } else {
            summary.imported += 1;
        }
    }
    cache.save()?;

    info!(
        imported = summary.imported,
        replaced = summary.replaced,
        path = %path.display(),
        "snapshot imported"
    );
    Ok((summary, state::distribution(cache)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{hashed::HashedFingerprint, FingerprintGenerator};
    use tempfile::TempDir;

    fn seeded_cache(dir: &TempDir) -> (MemoryCache, HashedFingerprint) {
        let generator = HashedFingerprint::new();
        let mut cache = MemoryCache::open(dir.path().join("memory.json"), &generator).unwrap();
        for (id, text, state) in [
            ("id-1", "an energizing trail run", Some(210u8)),
            ("id-2", "deadline pressure all afternoon", Some(45)),
            ("id-3", "uneventful tuesday", None),
        ] {
            let fp = generator.generate(text).unwrap();
            cache.store(id, fp, text, state).unwrap();
        }
        (cache, generator)
    }

    #[test]
    fn export_then_import_into_fresh_cache() {
        let dir = TempDir::new().unwrap();
        let (cache, generator) = seeded_cache(&dir);
        let snapshot_path = dir.path().join("backup.json");
        export(&cache, &snapshot_path).unwrap();

        let mut fresh =
            MemoryCache::open(dir.path().join("other.json"), &generator).unwrap();
        let (summary, stats) = import(&mut fresh, &snapshot_path).unwrap();

        assert_eq!(summary.imported, 3);
        assert_eq!(summary.replaced, 0);
        assert_eq!(fresh.len(), 3);
        assert_eq!(stats.tagged_entries, 2);

        let original = cache.get("id-1").unwrap();
        let imported = fresh.get("id-1").unwrap();
        assert_eq!(original.fingerprint, imported.fingerprint);
        assert_eq!(original.created_at, imported.created_at);
        assert_eq!(original.state_value, imported.state_value);
    }

    #[test]
    fn reimport_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (mut cache, _generator) = seeded_cache(&dir);
        let snapshot_path = dir.path().join("backup.json");
        export(&cache, &snapshot_path).unwrap();

        let (first, _) = import(&mut cache, &snapshot_path).unwrap();
        assert_eq!(first.imported, 0);
        assert_eq!(first.replaced, 3);

        let (second, _) = import(&mut cache, &snapshot_path).unwrap();
        assert_eq!(second.replaced, 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn import_rejects_foreign_generator() {
        let dir = TempDir::new().unwrap();
        let (cache, generator) = seeded_cache(&dir);
        let snapshot_path = dir.path().join("backup.json");
        export(&cache, &snapshot_path).unwrap();

        let raw = std::fs::read_to_string(&snapshot_path).unwrap();
        let swapped = raw.replace("simhash-sha256/128", "all-MiniLM-L6-v2/384");
        std::fs::write(&snapshot_path, swapped).unwrap();

        let mut target =
            MemoryCache::open(dir.path().join("other.json"), &generator).unwrap();
        let err = import(&mut target, &snapshot_path);
        assert!(matches!(err, Err(EngramError::GeneratorMismatch { .. })));
        assert!(target.is_empty());
    }

    #[test]
    fn import_missing_file_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        let (mut cache, _generator) = seeded_cache(&dir);
        let err = import(&mut cache, &dir.path().join("nope.json"));
        assert!(matches!(err, Err(EngramError::Persistence { .. })));
    }

    #[test]
    fn export_document_names_the_generator() {
        let dir = TempDir::new().unwrap();
        let (cache, _generator) = seeded_cache(&dir);
        let snapshot_path = dir.path().join("backup.json");
        export(&cache, &snapshot_path).unwrap();

        let raw = std::fs::read_to_string(&snapshot_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["generator"], "simhash-sha256/128");
        assert_eq!(value["fingerprint_len"], 128);
        assert_eq!(value["entries"].as_array().unwrap().len(), 3);
        assert_eq!(value["statistics"]["tagged_entries"], 2);
    }
}
