//! catch-ctl: command-line client for the catch daemon.

mod cmd;

use anyhow::{Context, Result};

use catch_core::config::DEFAULT_PORT;
use cmd::send::DEFAULT_CHUNK_SIZE;

fn print_usage() {
    println!("Usage: catch-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  send <file>   Upload a file as indexed chunks");
    println!("  status        Show pending chunks and the last flush");
    println!("  flush         Write buffered chunks now");
    println!("  shutdown      Flush and stop the daemon");
    println!();
    println!("Options:");
    println!("  --port <port>         Daemon port (default: {})", DEFAULT_PORT);
    println!("  --chunk-size <bytes>  Chunk size for send (default: {})", DEFAULT_CHUNK_SIZE);
    println!("  --reverse             Send chunks last-to-first");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut port = DEFAULT_PORT;
    let mut chunk_size = DEFAULT_CHUNK_SIZE;
    let mut reverse = false;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--chunk-size" => {
                i += 1;
                chunk_size = args
                    .get(i)
                    .context("--chunk-size requires a value")?
                    .parse()
                    .context("--chunk-size must be a number")?;
            }
            "--reverse" => reverse = true,
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["send", path]                 => cmd::send::cmd_send(port, path, chunk_size, reverse).await,
        ["status"] | []                => cmd::status::cmd_status(port).await,
        ["flush"]                      => cmd::status::cmd_flush(port).await,
        ["shutdown"]                   => cmd::status::cmd_shutdown(port).await,
        ["help"] | ["--help"] | ["-h"] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
