pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the HTTP router. Kept separate from `serve` so tests can drive it
/// in-process.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_chunk_bytes = state.max_chunk_bytes;

    Router::new()
        .route(
            "/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(max_chunk_bytes)),
        )
        .route("/status", get(handlers::handle_status))
        .route("/flush", post(handlers::handle_flush))
        .route("/daemon/shutdown", post(handlers::handle_shutdown))
        .with_state(state)
        .layer(cors)
}

pub async fn serve(state: ApiState, bind: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("{}:{}", bind, port)).await?;
    serve_on(listener, state).await
}

/// Serve on an already-bound listener until a shutdown signal is broadcast.
pub async fn serve_on(listener: TcpListener, state: ApiState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let app = router(state);

    tracing::info!(%addr, "upload endpoint listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;
    Ok(())
}
