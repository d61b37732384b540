//! Daemon status, flush, and shutdown commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json, post_json};

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    pending_chunks: usize,
    pending_bytes: u64,
    flushes: u64,
    failed_flushes: u64,
    timer_pending: bool,
    last_flush: Option<LastFlush>,
    timeout_secs: f64,
    output_path: String,
}

#[derive(Deserialize)]
struct LastFlush {
    chunks: usize,
    bytes: u64,
    blake3: String,
}

#[derive(Deserialize)]
struct FlushResponse {
    flushed: bool,
    chunks: usize,
    bytes: u64,
}

#[derive(Deserialize)]
struct ShutdownResponse {
    message: String,
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  catchd Status");
    println!("═══════════════════════════════════════");
    println!("  Output file     : {}", resp.output_path);
    println!("  Idle timeout    : {}s", resp.timeout_secs);
    println!("  Pending chunks  : {}", resp.pending_chunks);
    println!("  Pending bytes   : {}", resp.pending_bytes);
    println!(
        "  Timer           : {}",
        if resp.timer_pending { "armed" } else { "idle" }
    );
    println!("  Flushes         : {} ({} failed)", resp.flushes, resp.failed_flushes);

    match resp.last_flush {
        Some(f) => {
            println!("\n  Last flush:");
            println!("  ┌─ chunks : {}", f.chunks);
            println!("  │  bytes  : {}", f.bytes);
            println!("  └─ blake3 : {}", f.blake3);
        }
        None => println!("\n  Nothing flushed yet."),
    }

    Ok(())
}

pub async fn cmd_flush(port: u16) -> Result<()> {
    let resp: FlushResponse = post_json(&format!("{}/flush", base_url(port))).await?;
    if resp.flushed {
        println!("Flushed {} chunks ({} bytes).", resp.chunks, resp.bytes);
    } else {
        println!("Nothing to flush.");
    }
    Ok(())
}

pub async fn cmd_shutdown(port: u16) -> Result<()> {
    let resp: ShutdownResponse = post_json(&format!("{}/daemon/shutdown", base_url(port))).await?;
    println!("{}", resp.message);
    Ok(())
}
