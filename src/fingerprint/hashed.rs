//! Deterministic hash-based fingerprint strategy.
//!
//! Builds a 128-byte SimHash over the word content of a text: every token
//! contributes a 1024-bit signature derived from SHA-256, and each output
//! bit is the majority vote across tokens. Texts sharing words therefore
//! agree on more bits than unrelated texts, which makes normalized bit
//! agreement a usable similarity signal without any trained model. Scores
//! are graded, not calibrated — this is a reproducible stand-in, not a
//! claim of linguistic correctness.

use sha2::{Digest, Sha256};

use super::FingerprintGenerator;
use crate::error::{EngramError, Result};

/// Fingerprint width in bytes.
pub const FINGERPRINT_BYTES: usize = 128;

const FINGERPRINT_BITS: usize = FINGERPRINT_BYTES * 8;

/// Tokens shorter than this carry little signal and are skipped.
const MIN_TOKEN_CHARS: usize = 3;

/// SHA-256 digests per token needed to cover [`FINGERPRINT_BYTES`].
const DIGESTS_PER_TOKEN: usize = FINGERPRINT_BYTES / 32;

/// Hash-based fingerprint generator. Stateless and cheap to construct.
pub struct HashedFingerprint;

impl HashedFingerprint {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HashedFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintGenerator for HashedFingerprint {
    fn generate(&self, text: &str) -> Result<Vec<u8>> {
        let cleaned = super::normalize_input(text)?;
        let tokens = tokenize(&cleaned);
        if tokens.is_empty() {
            return Err(EngramError::InvalidInput(
                "text contains no usable words".to_string(),
            ));
        }

        // Majority vote per bit across all token signatures.
        let mut weights = [0i32; FINGERPRINT_BITS];
        for token in &tokens {
            let signature = token_signature(token);
            for (i, weight) in weights.iter_mut().enumerate() {
                if signature[i / 8] & (1 << (i % 8)) != 0 {
                    *weight += 1;
                } else {
                    *weight -= 1;
                }
            }
        }

        let mut fingerprint = vec![0u8; FINGERPRINT_BYTES];
        for (i, weight) in weights.iter().enumerate() {
            if *weight > 0 {
                fingerprint[i / 8] |= 1 << (i % 8);
            }
        }
        Ok(fingerprint)
    }

    fn fingerprint_len(&self) -> usize {
        FINGERPRINT_BYTES
    }

    fn identity(&self) -> String {
        format!("simhash-sha256/{FINGERPRINT_BYTES}")
    }

    /// Normalized bit agreement: `1 − hamming/bits`, in `[0, 1]`.
    fn score(&self, a: &[u8], b: &[u8]) -> f32 {
        let len = a.len().min(b.len());
        if len == 0 {
            return 0.0;
        }
        let hamming: u32 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        1.0 - hamming as f32 / (len * 8) as f32
    }
}

/// Lowercase alphabetic runs of at least [`MIN_TOKEN_CHARS`] characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .map(|w| w.to_string())
        .collect()
}

/// 1024-bit signature for one token: SHA-256 under four counters.
fn token_signature(token: &str) -> [u8; FINGERPRINT_BYTES] {
    let mut signature = [0u8; FINGERPRINT_BYTES];
    for counter in 0..DIGESTS_PER_TOKEN {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update([counter as u8]);
        let digest = hasher.finalize();
        signature[counter * 32..(counter + 1) * 32].copy_from_slice(&digest);
    }
    signature
}
