//! Chunk: one uploaded unit of binary data tagged with an ordering index.

use bytes::Bytes;

/// Name of the request header carrying a chunk's index.
pub const INDEX_HEADER: &str = "index";

/// A chunk held by the accumulator until it is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    pub data: Bytes,
}

impl Chunk {
    pub fn new(index: u64, data: impl Into<Bytes>) -> Self {
        Self {
            index,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("missing `index` header")]
    Missing,
    #[error("invalid `index` header {0:?}: expected a non-negative integer")]
    Malformed(String),
}

/// Validate a raw `index` header value.
///
/// Surrounding whitespace and a leading `+` are tolerated. Anything that does
/// not fit in a `u64` (negative, fractional, overflowing, empty) is rejected.
pub fn parse_index(raw: Option<&str>) -> Result<u64, IndexError> {
    let raw = raw.ok_or(IndexError::Missing)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| IndexError::Malformed(raw.to_string()))
}
