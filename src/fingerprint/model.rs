//! Trained-model fingerprint strategy.
//!
//! Implements [`FingerprintGenerator`] with all-MiniLM-L6-v2 via ONNX
//! Runtime: tokenization, inference, masked mean pooling, and L2
//! normalization. The 384-dimension float vector is encoded as little-endian
//! bytes so cache artifacts stay portable across hosts.

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::FingerprintGenerator;
use crate::config::FingerprintConfig;

/// Number of dimensions in the model's output vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length for all-MiniLM-L6-v2 (trained at 256).
const MAX_SEQ_LEN: usize = 256;

/// Model-based fingerprint generator using all-MiniLM-L6-v2.
pub struct ModelFingerprint {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_name: String,
}

// Safety: Tokenizer is Send+Sync. Session is behind a Mutex.
// The Mutex guarantees exclusive access during run().
unsafe impl Send for ModelFingerprint {}
unsafe impl Sync for ModelFingerprint {}

impl ModelFingerprint {
    pub fn new(config: &FingerprintConfig) -> Result<Self> {
        let model_dir = crate::config::expand_tilde(&config.model_dir);
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `engram model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Run `engram model download` first.",
            tokenizer_path.display()
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        tracing::info!(model = %model_path.display(), "ONNX model loaded");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;

        tracing::info!(tokenizer = %tokenizer_path.display(), "tokenizer loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_name: config.model.clone(),
        })
    }

    /// Run the model on one cleaned input and return the pooled vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Step 1: Tokenize
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let seq_len = encoding.get_ids().len();

        // Step 2: Build input tensors as i64
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let shape = vec![1i64, seq_len as i64];
        let input_ids_tensor =
            Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))?;
        // token_type_ids: all zeros (single sentence, no segment B)
        let token_type_ids = vec![0i64; seq_len];
        let token_type_ids_tensor =
            Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        // Step 3: Run ONNX inference
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

        let outputs = session.run(ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor,
        })?;

        // Step 4: Extract token embeddings — shape [1, seq_len, 384]
        // The output name varies by ONNX export. Try common names, fall back to index 0.
        let token_emb_value = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);

        let (out_shape, data) = token_emb_value
            .try_extract_tensor::<f32>()
            .context("failed to extract token_embeddings tensor")?;

        let dims: &[i64] = &out_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected token_embeddings shape: {dims:?}, expected [1, seq, {EMBEDDING_DIM}]"
        );
        let actual_seq_len = dims[1] as usize;

        // Step 5: Mean pooling with attention mask
        let mut sum = vec![0.0f32; EMBEDDING_DIM];
        let mut count = 0.0f32;
        for s in 0..actual_seq_len {
            let mask = attention_mask[s] as f32;
            if mask > 0.0 {
                let offset = s * EMBEDDING_DIM;
                for d in 0..EMBEDDING_DIM {
                    sum[d] += data[offset + d] * mask;
                }
                count += mask;
            }
        }
        if count > 0.0 {
            for v in &mut sum {
                *v /= count;
            }
        }

        // Step 6: L2 normalize
        Ok(l2_normalize(&sum))
    }
}

impl FingerprintGenerator for ModelFingerprint {
    fn generate(&self, text: &str) -> crate::error::Result<Vec<u8>> {
        let cleaned = super::normalize_input(text)?;
        let vector = self.embed(&cleaned).map_err(|e| {
            crate::error::EngramError::InvalidInput(format!("model inference failed: {e}"))
        })?;
        Ok(floats_to_bytes(&vector))
    }

    fn fingerprint_len(&self) -> usize {
        EMBEDDING_DIM * 4
    }

    fn identity(&self) -> String {
        format!("{}/{}", self.model_name, EMBEDDING_DIM)
    }

    /// Cosine similarity over the decoded float vectors, in `[-1, 1]`.
    fn score(&self, a: &[u8], b: &[u8]) -> f32 {
        let va = bytes_to_floats(a);
        let vb = bytes_to_floats(b);
        cosine_similarity(&va, &vb)
    }
}

/// Encode an f32 vector as little-endian bytes.
fn floats_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian bytes back into an f32 vector.
fn bytes_to_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
