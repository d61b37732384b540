//! Upload a file as indexed chunks.

use anyhow::{bail, Context, Result};

use catch_core::chunk::INDEX_HEADER;

use super::http::base_url;

/// Default chunk size for `send` (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Split `data` into `(index, chunk)` pairs of at most `chunk_size` bytes.
///
/// An empty input still yields one empty chunk so the daemon produces an
/// empty output file.
pub fn split_chunks(data: &[u8], chunk_size: usize) -> Vec<(u64, &[u8])> {
    if data.is_empty() {
        return vec![(0, data)];
    }
    data.chunks(chunk_size.max(1))
        .enumerate()
        .map(|(i, c)| (i as u64, c))
        .collect()
}

pub async fn cmd_send(port: u16, path: &str, chunk_size: usize, reverse: bool) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("failed to read file: {}", path))?;

    let mut chunks = split_chunks(&data, chunk_size);
    if reverse {
        chunks.reverse();
    }

    let client = reqwest::Client::new();
    let url = format!("{}/upload", base_url(port));
    for (index, chunk) in &chunks {
        let resp = client
            .post(&url)
            .header(INDEX_HEADER, index.to_string())
            .body(chunk.to_vec())
            .send()
            .await
            .with_context(|| format!("failed to upload chunk {}", index))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("chunk {} rejected ({}): {}", index, status, body);
        }
    }

    println!("File uploaded:");
    println!("  Path     : {}", path);
    println!("  Bytes    : {}", data.len());
    println!("  Chunks   : {}", chunks.len());
    println!("  Order    : {}", if reverse { "reversed" } else { "sequential" });
    println!("  BLAKE3   : {}", hex::encode(blake3::hash(&data).as_bytes()));

    Ok(())
}
