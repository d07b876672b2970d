//! Reflection journal memory index — fingerprint, persist, and recall
//! short text entries by similarity and mood state.
//!
//! Engram is the storage core of a personal reflection journal. Each entry
//! is reduced to a fixed-size fingerprint, persisted under a caller-supplied
//! content identifier, and optionally tagged with a 0–255 state value. The
//! cache can then be queried three ways: free-text similarity, state value
//! with tolerance, or state range.
//!
//! # Architecture
//!
//! - **Fingerprints**: two interchangeable strategies behind one trait —
//!   a deterministic 128-byte SimHash (default, no external files) and
//!   all-MiniLM-L6-v2 via ONNX Runtime. Each strategy carries its own
//!   similarity comparator.
//! - **Storage**: one JSON artifact holding the whole id → entry mapping,
//!   replaced atomically on every save and tagged with the generator
//!   identity so incompatible fingerprints are rebuilt, never rescored.
//! - **Queries**: similarity search, state/tolerance and state-range
//!   lookups, and distribution statistics, all O(n) reads over the cache.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`error`] — The error taxonomy shared by every operation
//! - [`fingerprint`] — Text-to-fingerprint strategies and their comparators
//! - [`memory`] — Core engine: cache, search, state index, stats, snapshots

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod memory;
