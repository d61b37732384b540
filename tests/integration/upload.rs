use crate::*;

/// Chunks sent last-to-first come out in index order after the window.
#[tokio::test]
async fn test_reversed_upload_is_reassembled() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let chunks: Vec<&[u8]> = content.chunks(777).collect();
    for (index, chunk) in chunks.iter().enumerate().rev() {
        let (status, body) = daemon.upload(Some(&index.to_string()), chunk).await?;
        assert_eq!(status, 200);
        assert_eq!(body, "Data received");
    }

    daemon.wait_for_flush().await;
    assert_eq!(std::fs::read(daemon.output_path())?, content);

    let status = daemon.status().await?;
    assert_eq!(status["flushes"], 1);
    assert_eq!(status["pending_chunks"], 0);
    assert_eq!(
        status["last_flush"]["blake3"],
        blake3::hash(&content).to_hex().to_string()
    );

    daemon.stop().await
}

/// The concrete scenario: B at index 1, then A at index 0.
#[tokio::test]
async fn test_two_chunks_out_of_order() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    daemon.upload(Some("1"), b"B").await?;
    daemon.upload(Some("0"), b"A").await?;
    daemon.wait_for_flush().await;

    assert_eq!(std::fs::read(daemon.output_path())?, b"AB");
    daemon.stop().await
}

/// Concurrent uploaders interleave freely; output is still index-ordered.
#[tokio::test]
async fn test_concurrent_uploads() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    let mut tasks = Vec::new();
    for index in 0..64u32 {
        let client = daemon.client.clone();
        let url = format!("{}/upload", daemon.base_url);
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .header("index", index.to_string())
                .body(index.to_be_bytes().to_vec())
                .send()
                .await
                .map(|r| r.status().as_u16())
        }));
    }
    for task in tasks {
        assert_eq!(task.await??, 200);
    }

    let status = daemon.status().await?;
    assert_eq!(status["pending_chunks"], 64);
    assert_eq!(status["timers_armed"], 1);

    daemon.wait_for_flush().await;
    let expected: Vec<u8> = (0..64u32).flat_map(|i| i.to_be_bytes()).collect();
    assert_eq!(std::fs::read(daemon.output_path())?, expected);

    daemon.stop().await
}

/// Two separate cycles: the second file holds only the second cycle's data.
#[tokio::test]
async fn test_second_cycle_replaces_output() -> Result<()> {
    let daemon = TestDaemon::start(WINDOW).await?;

    daemon.upload(Some("0"), b"first").await?;
    daemon.upload(Some("1"), b"-cycle").await?;
    daemon.wait_for_flush().await;
    assert_eq!(std::fs::read(daemon.output_path())?, b"first-cycle");

    daemon.upload(Some("0"), b"two").await?;
    daemon.wait_for_flush().await;
    assert_eq!(std::fs::read(daemon.output_path())?, b"two");

    assert_eq!(daemon.status().await?["flushes"], 2);
    daemon.stop().await
}

/// Shutting the daemon down flushes chunks whose window has not elapsed.
#[tokio::test]
async fn test_shutdown_flushes_pending() -> Result<()> {
    let daemon = TestDaemon::start(Duration::from_secs(3600)).await?;

    daemon.upload(Some("2"), b"!").await?;
    daemon.upload(Some("0"), b"bye").await?;
    daemon.upload(Some("1"), b"").await?;
    assert!(!daemon.output_path().exists());

    let resp = daemon.post("/daemon/shutdown").await?;
    assert!(resp.status().is_success());

    let report = daemon.state.accumulator.shutdown().await?.expect("pending chunks");
    assert_eq!(report.chunks, 3);
    assert_eq!(std::fs::read(daemon.output_path())?, b"bye!");

    daemon.stop().await
}
