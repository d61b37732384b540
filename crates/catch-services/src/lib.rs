//! catch-services: chunk accumulation and the output writer.

pub mod accumulator;
pub mod output;

pub use accumulator::{AccumulatorStats, ChunkAccumulator, FlushReport};
pub use output::write_chunks;
