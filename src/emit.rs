//! Atomic file emission.
//!
//! Generated files are written with the tempfile + rename pattern so a
//! half-written config can never be picked up by Compose. Emissions are
//! classified by content hash so callers can report whether anything
//! actually changed.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::LempResult;

/// What an emission did to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// File was created or its content changed.
    Written,
    /// File already held identical content; nothing was rewritten.
    Unchanged,
}

/// Write `content` to `path` atomically, creating parent directories.
pub fn atomic_write(path: &Path, content: &str) -> LempResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let tmp = tempfile::NamedTempFile::new_in(parent)?;
    fs::write(tmp.path(), content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Compute the SHA-256 hash of content, formatted as `sha256:<hex>`.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

/// Emit `content` to `path`, skipping the write when the file already
/// holds identical content.
pub fn emit(path: &Path, content: &str) -> LempResult<EmitOutcome> {
    if let Ok(existing) = fs::read(path) {
        if hash_content(&existing) == hash_content(content.as_bytes()) {
            return Ok(EmitOutcome::Unchanged);
        }
    }
    atomic_write(path, content)?;
    Ok(EmitOutcome::Written)
}
