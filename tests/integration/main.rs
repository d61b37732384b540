//! catch integration test harness.
//!
//! Each test starts its own daemon in-process on an OS-assigned port with a
//! private output directory, then drives it over real HTTP.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use catch_api::ApiState;
use catch_services::ChunkAccumulator;

mod failures;
mod upload;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Inactivity window used by tests that wait for the timer.
pub const WINDOW: Duration = Duration::from_millis(300);

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TestDaemon {
    pub base_url: String,
    pub dir: PathBuf,
    pub state: ApiState,
    pub client: reqwest::Client,
    server: JoinHandle<Result<()>>,
}

impl TestDaemon {
    /// Start a daemon writing to `<tmp>/output_dir/output_file.bin`.
    pub async fn start(window: Duration) -> Result<Self> {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("catch-it-{}-{}", std::process::id(), id));
        let _ = std::fs::remove_dir_all(&dir);
        let output_dir = dir.join("output_dir");
        std::fs::create_dir_all(&output_dir)?;

        let accumulator = ChunkAccumulator::new(output_dir.join("output_file.bin"), window);
        let state = ApiState::new(accumulator, 1024 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let server = tokio::spawn(catch_api::serve_on(listener, state.clone()));

        Ok(Self {
            base_url,
            dir,
            state,
            client: reqwest::Client::new(),
            server,
        })
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join("output_dir").join("output_file.bin")
    }

    /// POST one chunk. `index` is sent verbatim when present.
    pub async fn upload(&self, index: Option<&str>, body: &[u8]) -> Result<(u16, String)> {
        let mut req = self
            .client
            .post(format!("{}/upload", self.base_url))
            .body(body.to_vec());
        if let Some(index) = index {
            req = req.header("index", index);
        }
        let resp = req.send().await.context("upload request failed")?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    pub async fn status(&self) -> Result<serde_json::Value> {
        Ok(self
            .client
            .get(format!("{}/status", self.base_url))
            .send()
            .await?
            .json()
            .await?)
    }

    pub async fn post(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?)
    }

    /// Wait long enough for the inactivity timer to fire.
    pub async fn wait_for_flush(&self) {
        tokio::time::sleep(self.state.accumulator.timeout() * 3).await;
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.state.shutdown_tx.send(());
        self.server.await??;
        let _ = std::fs::remove_dir_all(&self.dir);
        Ok(())
    }
}
