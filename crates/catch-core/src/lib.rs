//! catch-core: shared chunk types, index validation, and configuration.
//! All other catch crates depend on this one.

pub mod chunk;
pub mod config;

pub use chunk::{parse_index, Chunk, IndexError};
