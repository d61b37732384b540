//! catchd: receives indexed chunks over HTTP and writes them out in order
//! once uploads go quiet.

use anyhow::{Context, Result};

use catch_core::config::CatchConfig;
use catch_services::ChunkAccumulator;

/// Parse `--port <port>` from the command line, if present.
fn port_override(args: &[String]) -> Result<Option<u16>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--port" {
            let port = iter
                .next()
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
            return Ok(Some(port));
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = CatchConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let mut config = CatchConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        CatchConfig::default()
    });
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(port) = port_override(&args)? {
        config.server.port = port;
    }

    std::fs::create_dir_all(&config.output.dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            config.output.dir.display()
        )
    })?;

    let output_path = config.output.path();
    let timeout = config.accumulator.inactivity_timeout();
    tracing::info!(
        path = %output_path.display(),
        timeout_secs = timeout.as_secs(),
        "catchd starting"
    );

    let accumulator = ChunkAccumulator::new(output_path, timeout);
    let state = catch_api::ApiState::new(accumulator.clone(), config.server.max_chunk_bytes);

    // ── Shutdown ─────────────────────────────────────────────────────────────
    {
        let shutdown = state.shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    let served = catch_api::serve(state, &config.server.bind, config.server.port).await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "upload server failed");
    }

    // Whatever is still buffered goes to disk before exit.
    match accumulator.shutdown().await {
        Ok(Some(report)) => tracing::info!(
            chunks = report.chunks,
            bytes = report.bytes,
            "flushed pending chunks on shutdown"
        ),
        Ok(None) => {}
        Err(e) => {
            let error = format!("{e:#}");
            tracing::error!(%error, "final flush failed, buffered chunks lost");
        }
    }

    served
}
