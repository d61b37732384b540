//! HTTP API handlers: chunk uploads and accumulator control.

pub mod status;
pub mod upload;

use catch_services::ChunkAccumulator;

#[derive(Clone)]
pub struct ApiState {
    pub accumulator: ChunkAccumulator,
    /// Largest accepted `/upload` body.
    pub max_chunk_bytes: usize,
    /// Shutdown broadcast sender, signals graceful daemon shutdown.
    pub shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl ApiState {
    pub fn new(accumulator: ChunkAccumulator, max_chunk_bytes: usize) -> Self {
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
        Self {
            accumulator,
            max_chunk_bytes,
            shutdown_tx,
        }
    }
}

// Re-export handler functions for use in router setup.
pub use status::{handle_flush, handle_shutdown, handle_status};
pub use upload::handle_upload;
