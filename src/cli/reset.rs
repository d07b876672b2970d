//! CLI `reset` command — delete the cache artifact after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use crate::config::EngramConfig;

/// Delete the cache artifact after confirmation. Used to rebuild after a
/// fingerprint configuration change.
pub fn reset(config: &EngramConfig) -> Result<()> {
    let cache_path = config.resolved_cache_path();

    println!("WARNING: This will permanently delete ALL stored memories and state tags.");
    println!("Cache artifact: {}", cache_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    if cache_path.exists() {
        std::fs::remove_file(&cache_path)?;
    }
    // Clear a leftover temp file from an interrupted save, if any.
    let tmp_path = cache_path.with_extension("tmp");
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)?;
    }

    println!("All memories deleted. Cache reset complete.");
    Ok(())
}
