//! Chunk accumulator: buffers indexed chunks and flushes them in index order
//! once uploads go quiet.
//!
//! Every `receive` pushes the chunk and bumps `last_update`. A single timer
//! task per accumulation cycle watches the deadline `last_update + timeout`:
//! when it wakes early (a newer chunk moved the deadline) it sleeps again;
//! once the window has passed with no new chunk it drains the buffer and
//! writes the output file.
//!
//! Lock order is `writer` → `state`. `receive` only ever takes `state`, so
//! uploads never wait on disk I/O.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use catch_core::Chunk;

use crate::output::write_chunks;

/// Outcome of one successful flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub chunks: usize,
    pub bytes: u64,
    /// BLAKE3 digest (hex) of the written file.
    pub blake3: String,
    pub path: PathBuf,
}

/// Point-in-time view of the accumulator, for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AccumulatorStats {
    pub pending_chunks: usize,
    pub pending_bytes: u64,
    pub flushes: u64,
    pub failed_flushes: u64,
    /// Inactivity timers started since startup. One per accumulation cycle.
    pub timers_armed: u64,
    pub timer_pending: bool,
    pub last_flush: Option<FlushReport>,
}

/// Cloneable handle to the shared accumulator.
#[derive(Clone)]
pub struct ChunkAccumulator {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<AccumulatorState>,
    /// Serializes flushes so output writes never interleave or land out of order.
    writer: Mutex<()>,
    timeout: Duration,
    output_path: PathBuf,
}

struct AccumulatorState {
    /// Arrival order.
    chunks: Vec<Chunk>,
    pending_bytes: u64,
    last_update: Instant,
    timer: Option<JoinHandle<()>>,
    timers_armed: u64,
    flushes: u64,
    failed_flushes: u64,
    last_flush: Option<FlushReport>,
}

impl AccumulatorState {
    fn take_chunks(&mut self) -> Vec<Chunk> {
        self.pending_bytes = 0;
        std::mem::take(&mut self.chunks)
    }

    /// End the current accumulation cycle: release the timer slot and take
    /// its chunks. The next `receive` arms a fresh timer.
    fn close_cycle(&mut self) -> Vec<Chunk> {
        self.timer = None;
        self.take_chunks()
    }

    /// Put chunks from a failed flush back ahead of anything that arrived
    /// while the write was in progress.
    fn restore(&mut self, mut chunks: Vec<Chunk>) {
        chunks.append(&mut self.chunks);
        self.pending_bytes = chunks.iter().map(|c| c.len() as u64).sum();
        self.chunks = chunks;
    }
}

impl ChunkAccumulator {
    pub fn new(output_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(AccumulatorState {
                    chunks: Vec::new(),
                    pending_bytes: 0,
                    last_update: Instant::now(),
                    timer: None,
                    timers_armed: 0,
                    flushes: 0,
                    failed_flushes: 0,
                    last_flush: None,
                }),
                writer: Mutex::new(()),
                timeout,
                output_path: output_path.into(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn output_path(&self) -> &Path {
        &self.inner.output_path
    }

    /// Buffer a chunk and push the inactivity deadline out to `now + timeout`.
    pub async fn receive(&self, index: u64, data: Bytes) {
        let bytes = data.len();
        let mut state = self.inner.state.lock().await;
        state.chunks.push(Chunk { index, data });
        state.pending_bytes += bytes as u64;
        state.last_update = Instant::now();

        if state.timer.is_none() {
            let this = self.clone();
            state.timer = Some(tokio::spawn(async move { this.watch_inactivity().await }));
            state.timers_armed += 1;
        }
    }

    /// Flush now, regardless of the inactivity window.
    ///
    /// Returns `Ok(None)` without touching the output file when nothing is
    /// buffered. On error the chunks stay buffered for the next attempt.
    pub async fn flush(&self) -> Result<Option<FlushReport>> {
        let _writer = self.inner.writer.lock().await;
        let chunks = self.inner.state.lock().await.take_chunks();
        self.write_cycle(chunks).await
    }

    /// Cancel the pending timer and flush whatever is buffered.
    pub async fn shutdown(&self) -> Result<Option<FlushReport>> {
        if let Some(timer) = self.inner.state.lock().await.timer.take() {
            timer.abort();
        }
        self.flush().await
    }

    pub async fn stats(&self) -> AccumulatorStats {
        let state = self.inner.state.lock().await;
        AccumulatorStats {
            pending_chunks: state.chunks.len(),
            pending_bytes: state.pending_bytes,
            flushes: state.flushes,
            failed_flushes: state.failed_flushes,
            timers_armed: state.timers_armed,
            timer_pending: state.timer.is_some(),
            last_flush: state.last_flush.clone(),
        }
    }

    /// Number of chunks waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.inner.state.lock().await.chunks.len()
    }

    /// Body of the per-cycle timer task.
    async fn watch_inactivity(self) {
        loop {
            let writer = self.inner.writer.lock().await;
            let mut state = self.inner.state.lock().await;
            // A window too large to represent never elapses; only an explicit
            // flush or shutdown drains the buffer.
            let Some(deadline) = state.last_update.checked_add(self.inner.timeout) else {
                drop(state);
                drop(writer);
                std::future::pending::<()>().await;
                return;
            };
            if Instant::now() < deadline {
                drop(state);
                drop(writer);
                tokio::time::sleep_until(deadline).await;
                continue;
            }

            // Window elapsed. Anything received after this point belongs to
            // the next cycle and arms its own timer.
            let chunks = state.close_cycle();
            drop(state);

            if chunks.is_empty() {
                return;
            }
            tracing::info!(
                chunks = chunks.len(),
                idle_ms = self.inner.timeout.as_millis() as u64,
                "inactivity window elapsed, flushing"
            );
            if let Err(e) = self.write_cycle(chunks).await {
                let error = format!("{e:#}");
                tracing::error!(
                    %error,
                    path = %self.inner.output_path.display(),
                    "flush failed, chunks retained"
                );
            }
            drop(writer);
            return;
        }
    }

    /// Sort and write one drained cycle. Caller must hold `writer`.
    async fn write_cycle(&self, mut chunks: Vec<Chunk>) -> Result<Option<FlushReport>> {
        if chunks.is_empty() {
            return Ok(None);
        }

        // Stable: equal indices keep arrival order.
        chunks.sort_by_key(|c| c.index);

        let path = self.inner.output_path.clone();
        let to_write = chunks.clone();
        let result = tokio::task::spawn_blocking(move || write_chunks(&path, &to_write))
            .await
            .context("output writer task failed")
            .and_then(|r| r);

        let mut state = self.inner.state.lock().await;
        match result {
            Ok(written) => {
                let report = FlushReport {
                    chunks: chunks.len(),
                    bytes: written.bytes,
                    blake3: written.blake3,
                    path: self.inner.output_path.clone(),
                };
                state.flushes += 1;
                state.last_flush = Some(report.clone());
                tracing::info!(
                    chunks = report.chunks,
                    bytes = report.bytes,
                    blake3 = %report.blake3,
                    path = %report.path.display(),
                    "output written"
                );
                Ok(Some(report))
            }
            Err(e) => {
                state.failed_flushes += 1;
                state.restore(chunks);
                Err(e)
            }
        }
    }
}
