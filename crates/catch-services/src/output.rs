//! Output writer: concatenates ordered chunks into the output file.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use catch_core::Chunk;

/// Result of writing one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub bytes: u64,
    /// BLAKE3 digest (hex) of the bytes written.
    pub blake3: String,
}

/// Write `chunks` back to back into `path`, replacing any previous content.
///
/// Writes are atomic: write to `<path>.tmp`, sync, then rename. A failed write
/// leaves the previous output file untouched. The caller is responsible for
/// ordering; this function writes chunks exactly as given.
pub fn write_chunks(path: &Path, chunks: &[Chunk]) -> Result<Written> {
    let tmp_path = path.with_extension("tmp");
    let result = write_then_rename(&tmp_path, path, chunks);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, chunks: &[Chunk]) -> Result<Written> {
    let mut hasher = blake3::Hasher::new();
    let mut bytes = 0u64;
    {
        let mut file = fs::File::create(tmp_path)
            .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;
        for chunk in chunks {
            file.write_all(&chunk.data)
                .with_context(|| format!("failed to write chunk {}", chunk.index))?;
            hasher.update(&chunk.data);
            bytes += chunk.data.len() as u64;
        }
        file.sync_all().context("failed to sync output to disk")?;
    }

    fs::rename(tmp_path, path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(Written {
        bytes,
        blake3: hex::encode(hasher.finalize().as_bytes()),
    })
}
