//! /status, /flush, /daemon/shutdown handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use catch_services::AccumulatorStats;

use super::ApiState;

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub accumulator: AccumulatorStats,
    pub timeout_secs: f64,
    pub output_path: String,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let acc = &state.accumulator;
    Json(StatusResponse {
        accumulator: acc.stats().await,
        timeout_secs: acc.timeout().as_secs_f64(),
        output_path: acc.output_path().display().to_string(),
    })
}

// ── /flush ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FlushResponse {
    pub flushed: bool,
    pub chunks: usize,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blake3: Option<String>,
}

pub async fn handle_flush(
    State(state): State<ApiState>,
) -> Result<Json<FlushResponse>, (StatusCode, String)> {
    let report = state.accumulator.flush().await.map_err(|e| {
        let error = format!("{e:#}");
        tracing::error!(%error, "flush via API failed, chunks retained");
        (StatusCode::INTERNAL_SERVER_ERROR, error)
    })?;

    Ok(Json(match report {
        Some(r) => FlushResponse {
            flushed: true,
            chunks: r.chunks,
            bytes: r.bytes,
            blake3: Some(r.blake3),
        },
        None => FlushResponse {
            flushed: false,
            chunks: 0,
            bytes: 0,
            blake3: None,
        },
    }))
}

// ── /daemon/shutdown ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ShutdownResponse {
    pub message: String,
}

pub async fn handle_shutdown(State(state): State<ApiState>) -> Json<ShutdownResponse> {
    tracing::info!("shutdown requested via API");
    let _ = state.shutdown_tx.send(());

    Json(ShutdownResponse {
        message: "Shutdown initiated".to_string(),
    })
}
