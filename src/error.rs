//! Error taxonomy for the memory index.
//!
//! Three families, matching who has to react:
//!
//! - [`EngramError::InvalidInput`] — the caller's fault (empty text, bad
//!   fingerprint length, inverted range bounds). Never retried.
//! - [`EngramError::Persistence`] — artifact I/O. Load failures degrade to
//!   an empty cache with a logged warning so the journal stays usable; save
//!   failures propagate so data loss is visible.
//! - [`EngramError::GeneratorMismatch`] — the artifact was written under a
//!   different fingerprint configuration. Fatal for that artifact; the host
//!   decides to rebuild (`engram reset`), the core never reinterprets
//!   incompatible vectors.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngramError>;

#[derive(Debug, Error)]
pub enum EngramError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("persistence failure at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "cache artifact at {} was written by generator `{found}`, \
         but the active generator is `{active}`",
        .path.display()
    )]
    GeneratorMismatch {
        path: PathBuf,
        found: String,
        active: String,
    },
}

impl EngramError {
    /// Wrap an I/O or serialization failure that touched `path`.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
