//! /upload handler: accepts one indexed chunk per request.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use catch_core::chunk::INDEX_HEADER;
use catch_core::{parse_index, IndexError};

use super::ApiState;

/// Body returned for every accepted chunk.
pub const ACK: &str = "Data received";

pub async fn handle_upload(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, (StatusCode, String)> {
    let index = index_from_headers(&headers).map_err(|e| {
        tracing::warn!(error = %e, "upload rejected");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    tracing::info!(index, bytes = body.len(), "chunk received");
    state.accumulator.receive(index, body).await;

    Ok(ACK)
}

fn index_from_headers(headers: &HeaderMap) -> Result<u64, IndexError> {
    let raw = match headers.get(INDEX_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| {
            IndexError::Malformed(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?),
        None => None,
    };
    parse_index(raw)
}
