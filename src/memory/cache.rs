//! Persistent fingerprint cache — the single owner of all entry data.
//!
//! One JSON artifact on disk holds the whole id → entry mapping together
//! with the identity of the generator that produced the fingerprints.
//! Similarity search and the state index are stateless views that read the
//! in-memory mapping on every call.
//!
//! Mutations (`store`, `rekey`, `insert` + `save`) take `&mut self`, so a
//! single process cannot interleave writers. Across processes the artifact
//! is last-writer-wins as a whole: `save` replaces the file atomically via
//! a temp path and rename, so a reader never observes a half-written
//! artifact, but two independent writers will keep only the later mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngramError, Result};
use crate::fingerprint::FingerprintGenerator;
use crate::memory::types::{truncate_preview, MemoryEntry, PREVIEW_CHARS};

const ARTIFACT_VERSION: u32 = 1;

/// On-disk artifact layout. Fingerprints are hex-encoded so the document
/// stays portable and diffable.
#[derive(Debug, Serialize, Deserialize)]
struct Artifact {
    version: u32,
    generator: String,
    fingerprint_len: usize,
    saved_at: String,
    entries: BTreeMap<String, ArtifactEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEntry {
    fingerprint: String,
    preview: String,
    created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_value: Option<u8>,
}

/// Persistent mapping from content identifier to [`MemoryEntry`].
pub struct MemoryCache {
    path: PathBuf,
    generator_id: String,
    fingerprint_len: usize,
    entries: BTreeMap<String, MemoryEntry>,
}

impl MemoryCache {
    /// Open the cache at `path` for the given generator configuration.
    ///
    /// A missing or unreadable artifact logs a warning and starts empty —
    /// the journal stays usable with no history. An artifact written by a
    /// different generator configuration is rejected with
    /// [`EngramError::GeneratorMismatch`] so the host can rebuild instead
    /// of scoring incompatible fingerprints.
    pub fn open(path: impl Into<PathBuf>, generator: &dyn FingerprintGenerator) -> Result<Self> {
        let mut cache = Self {
            path: path.into(),
            generator_id: generator.identity(),
            fingerprint_len: generator.fingerprint_len(),
            entries: BTreeMap::new(),
        };
        cache.load()?;
        Ok(cache)
    }

    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no cache artifact, starting empty");
            return Ok(());
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache artifact unreadable, starting empty");
                return Ok(());
            }
        };

        let artifact: Artifact = match serde_json::from_str(&raw) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache artifact corrupt, starting empty");
                return Ok(());
            }
        };

        if artifact.generator != self.generator_id
            || artifact.fingerprint_len != self.fingerprint_len
        {
            return Err(EngramError::GeneratorMismatch {
                path: self.path.clone(),
                found: artifact.generator,
                active: self.generator_id.clone(),
            });
        }

        for (content_id, stored) in artifact.entries {
            let fingerprint = match hex::decode(&stored.fingerprint) {
                Ok(fingerprint) => fingerprint,
                Err(e) => {
                    warn!(content_id = %content_id, error = %e, "skipping entry with undecodable fingerprint");
                    continue;
                }
            };
            if fingerprint.len() != self.fingerprint_len {
                return Err(EngramError::GeneratorMismatch {
                    path: self.path.clone(),
                    found: format!("{} ({} bytes)", artifact.generator, fingerprint.len()),
                    active: self.generator_id.clone(),
                });
            }
            self.entries.insert(
                content_id.clone(),
                MemoryEntry {
                    content_id,
                    fingerprint,
                    preview: stored.preview,
                    created_at: stored.created_at,
                    state_value: stored.state_value,
                },
            );
        }

        info!(count = self.entries.len(), path = %self.path.display(), "cache artifact loaded");
        Ok(())
    }

    /// Insert or overwrite an entry and flush to disk.
    ///
    /// `created_at` is set only on first insertion; overwriting an existing
    /// id keeps the original timestamp. The preview is truncated to
    /// [`PREVIEW_CHARS`] characters.
    pub fn store(
        &mut self,
        content_id: &str,
        fingerprint: Vec<u8>,
        preview_text: &str,
        state_value: Option<u8>,
    ) -> Result<()> {
        if content_id.trim().is_empty() {
            return Err(EngramError::InvalidInput(
                "content id must not be empty".to_string(),
            ));
        }
        self.check_fingerprint_len(&fingerprint)?;

        let created_at = self
            .entries
            .get(content_id)
            .map(|existing| existing.created_at.clone())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        self.entries.insert(
            content_id.to_string(),
            MemoryEntry {
                content_id: content_id.to_string(),
                fingerprint,
                preview: truncate_preview(preview_text, PREVIEW_CHARS),
                created_at,
                state_value,
            },
        );
        self.save()?;

        debug!(content_id, "entry stored");
        Ok(())
    }

    /// Insert a fully-formed entry, keeping its own timestamp. Does not
    /// flush — the snapshot import path batches many inserts into one save.
    ///
    /// Returns `true` if an existing entry with the same id was replaced.
    pub fn insert(&mut self, entry: MemoryEntry) -> Result<bool> {
        if entry.content_id.trim().is_empty() {
            return Err(EngramError::InvalidInput(
                "content id must not be empty".to_string(),
            ));
        }
        self.check_fingerprint_len(&entry.fingerprint)?;
        let replaced = self.entries.insert(entry.content_id.clone(), entry);
        Ok(replaced.is_some())
    }

    /// Move an entry to a new identifier without touching its fingerprint
    /// or timestamp. Used when a temporary local id is replaced by a
    /// permanent content hash once external storage completes.
    ///
    /// The move happens in memory first and is persisted by a single
    /// atomic save, so the artifact never holds the entry under both ids.
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> Result<()> {
        if new_id.trim().is_empty() {
            return Err(EngramError::InvalidInput(
                "new content id must not be empty".to_string(),
            ));
        }
        let mut entry = self
            .entries
            .remove(old_id)
            .ok_or_else(|| EngramError::InvalidInput(format!("unknown content id: {old_id}")))?;
        entry.content_id = new_id.to_string();
        self.entries.insert(new_id.to_string(), entry);
        self.save()?;

        debug!(old_id, new_id, "entry re-keyed");
        Ok(())
    }

    /// Serialize the whole mapping to the artifact path.
    ///
    /// Writes to `<path>.tmp` and renames over the live artifact, so a
    /// crash mid-write leaves the previous artifact intact. Failures
    /// propagate — a silent save failure would be invisible data loss.
    pub fn save(&self) -> Result<()> {
        let artifact = Artifact {
            version: ARTIFACT_VERSION,
            generator: self.generator_id.clone(),
            fingerprint_len: self.fingerprint_len,
            saved_at: chrono::Utc::now().to_rfc3339(),
            entries: self
                .entries
                .iter()
                .map(|(id, entry)| {
                    (
                        id.clone(),
                        ArtifactEntry {
                            fingerprint: hex::encode(&entry.fingerprint),
                            preview: entry.preview.clone(),
                            created_at: entry.created_at.clone(),
                            state_value: entry.state_value,
                        },
                    )
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&artifact)
            .map_err(|e| EngramError::persistence(&self.path, e))?;
        write_atomic(&self.path, &json)?;

        debug!(count = self.entries.len(), path = %self.path.display(), "cache artifact saved");
        Ok(())
    }

    fn check_fingerprint_len(&self, fingerprint: &[u8]) -> Result<()> {
        if fingerprint.len() != self.fingerprint_len {
            return Err(EngramError::InvalidInput(format!(
                "fingerprint length {} does not match the cache's {} (generator `{}`)",
                fingerprint.len(),
                self.fingerprint_len,
                self.generator_id
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, content_id: &str) -> Option<&MemoryEntry> {
        self.entries.get(content_id)
    }

    /// All entries, in content-id order.
    pub fn entries(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.values()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generator_id(&self) -> &str {
        &self.generator_id
    }

    pub fn fingerprint_len(&self) -> usize {
        self.fingerprint_len
    }
}

/// Write `contents` to `path` via a temp file and atomic rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| EngramError::persistence(path, e))?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents).map_err(|e| EngramError::persistence(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| EngramError::persistence(path, e))?;
    Ok(())
}
