//! Text-to-fingerprint pipeline.
//!
//! Provides the [`FingerprintGenerator`] trait and two interchangeable
//! implementations selected by configuration: a deterministic hash-based
//! strategy ([`hashed`], the default) and a trained-model strategy
//! ([`model`], all-MiniLM-L6-v2 via ONNX Runtime). Both produce fingerprints
//! of a fixed byte length and carry their own similarity comparator, so
//! downstream code never branches on the strategy.

pub mod hashed;
pub mod model;

use crate::error::{EngramError, Result};

/// Maximum number of characters fed into a generator. Longer inputs are
/// truncated so fingerprinting cost is bounded by configuration, not by
/// caller-supplied input size.
pub const MAX_INPUT_CHARS: usize = 512;

/// Trait for turning text into fixed-size fingerprints.
///
/// Implementations must be deterministic for a fixed configuration and must
/// never vary the fingerprint length. All methods are synchronous — callers
/// in async contexts should use `tokio::task::spawn_blocking`.
pub trait FingerprintGenerator: Send + Sync {
    /// Fingerprint a single text. Fails with `InvalidInput` on empty or
    /// non-text input.
    fn generate(&self, text: &str) -> Result<Vec<u8>>;

    /// Fingerprint length in bytes. Constant for the life of the generator.
    fn fingerprint_len(&self) -> usize;

    /// Configuration tag recorded in every cache artifact. A cache written
    /// under one identity is rejected by a generator with another, forcing
    /// a rebuild instead of silently meaningless scores.
    fn identity(&self) -> String;

    /// Similarity between two fingerprints this generator produced. The
    /// comparator is part of the generator contract: bit agreement for the
    /// hashed strategy, cosine for the model strategy. The maximum of the
    /// score range is 1.0, reached when `a == b`.
    fn score(&self, a: &[u8], b: &[u8]) -> f32;
}

/// Create a fingerprint generator from config.
///
/// `"hashed"` needs no external files; `"model"` requires the ONNX model —
/// run `engram model download` first.
pub fn create_generator(
    config: &crate::config::FingerprintConfig,
) -> anyhow::Result<Box<dyn FingerprintGenerator>> {
    match config.strategy.as_str() {
        "hashed" => Ok(Box::new(hashed::HashedFingerprint::new())),
        "model" => {
            let generator = model::ModelFingerprint::new(config)?;
            Ok(Box::new(generator))
        }
        other => anyhow::bail!("unknown fingerprint strategy: {other}. Supported: hashed, model"),
    }
}

/// Collapse whitespace and truncate to [`MAX_INPUT_CHARS`] characters.
///
/// Rejects input that is empty or whitespace-only — every generator applies
/// this before fingerprinting so the determinism and length contracts hold
/// for cleaned input, not raw bytes.
pub(crate) fn normalize_input(text: &str) -> Result<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngramError::InvalidInput(
            "text must not be empty".to_string(),
        ));
    }
    Ok(collapsed.chars().take(MAX_INPUT_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        let out = normalize_input("  a \t b\n\nc  ").unwrap();
        assert_eq!(out, "a b c");
    }

    #[test]
    fn normalize_rejects_empty() {
        assert!(normalize_input("").is_err());
        assert!(normalize_input("   \n\t ").is_err());
    }

    #[test]
    fn normalize_truncates_long_input() {
        let long = "word ".repeat(400);
        let out = normalize_input(&long).unwrap();
        assert_eq!(out.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let config = crate::config::FingerprintConfig {
            strategy: "quantum".into(),
            ..crate::config::FingerprintConfig::default()
        };
        let err = create_generator(&config).unwrap_err();
        assert!(err.to_string().contains("unknown fingerprint strategy"));
    }
}
