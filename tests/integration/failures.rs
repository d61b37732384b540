use crate::*;

#[tokio::test]
async fn test_missing_index_rejected() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    daemon.upload(Some("0"), b"kept").await?;
    let (status, body) = daemon.upload(None, b"dropped").await?;
    assert_eq!(status, 400);
    assert!(body.contains("index"), "body: {body}");

    assert_eq!(daemon.status().await?["pending_chunks"], 1);
    daemon.wait_for_flush().await;
    assert_eq!(std::fs::read(daemon.output_path())?, b"kept");

    daemon.stop().await
}

#[tokio::test]
async fn test_malformed_index_rejected() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    for bad in ["one", "-3", "1e3", ""] {
        let (status, _) = daemon.upload(Some(bad), b"x").await?;
        assert_eq!(status, 400, "index {bad:?} should be rejected");
    }
    assert_eq!(daemon.status().await?["pending_chunks"], 0);
    assert_eq!(daemon.status().await?["timers_armed"], 0);

    daemon.stop().await
}

/// Output directory disappears: the flush fails, nothing is lost, and a
/// manual flush succeeds once the directory is back.
#[tokio::test]
async fn test_write_failure_retains_chunks() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;
    let output_dir = daemon.dir.join("output_dir");
    std::fs::remove_dir_all(&output_dir)?;

    daemon.upload(Some("1"), b"world").await?;
    daemon.upload(Some("0"), b"hello ").await?;
    daemon.wait_for_flush().await;

    let status = daemon.status().await?;
    assert_eq!(status["pending_chunks"], 2);
    assert_eq!(status["failed_flushes"], 1);
    assert_eq!(status["flushes"], 0);

    let resp = daemon.post("/flush").await?;
    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(daemon.status().await?["pending_chunks"], 2);

    std::fs::create_dir_all(&output_dir)?;
    let resp = daemon.post("/flush").await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["flushed"], true);
    assert_eq!(body["chunks"], 2);

    assert_eq!(std::fs::read(daemon.output_path())?, b"hello world");
    daemon.stop().await
}

#[tokio::test]
async fn test_flush_with_nothing_buffered() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    let resp = daemon.post("/flush").await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["flushed"], false);
    assert!(!daemon.output_path().exists());

    daemon.stop().await
}
