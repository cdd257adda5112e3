//! What a failed connection leaves in the log.
//!
//! Kept in its own test binary: the capturing subscriber is thread-local and
//! `#[tokio::test]` runs every task on the test thread.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing_subscriber::fmt::MakeWriter;

mod common;

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    async fn wait_for_line(&self, needle: &str) -> String {
        for _ in 0..100 {
            if let Some(line) = self.lines().into_iter().find(|l| l.contains(needle)) {
                return line;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("no log line containing {needle:?}:\n{}", self.lines().join("\n"));
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn write_failure(peer: SocketAddr) -> String {
    format!("failed to write response to {peer}")
}

#[tokio::test]
async fn test_hangup_before_response_logs_write_failure() {
    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let config = common::test_config(Duration::from_secs(1));
    let mut manager = common::start_with_slow_route(&config, Duration::from_millis(500)).await;
    let addr = manager.local_addr();

    // A full request, then gone while the handler is still sleeping.
    let mut hangup = TcpStream::connect(addr).await.unwrap();
    let hangup_peer = hangup.local_addr().unwrap();
    hangup
        .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(hangup);

    let line = logs.wait_for_line(&write_failure(hangup_peer)).await;
    assert!(line.contains("WARN"), "not a warning: {line}");

    // Garbage in: the server answers 400 and closes, nothing was owed.
    let mut garbage = TcpStream::connect(addr).await.unwrap();
    let garbage_peer = garbage.local_addr().unwrap();
    garbage.write_all(b"NOT HTTP AT ALL\r\n\r\n").await.unwrap();
    let mut response = Vec::new();
    garbage.read_to_end(&mut response).await.unwrap();
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 400"));
    drop(garbage);

    let line = logs
        .wait_for_line(&format!("unusable request from {garbage_peer}"))
        .await;
    assert!(line.contains("DEBUG"), "not debug: {line}");
    assert!(
        !logs
            .lines()
            .iter()
            .any(|l| l.contains(&write_failure(garbage_peer))),
        "malformed request reported as a write failure"
    );

    // A request head cut off halfway is not a write failure either.
    let mut truncated = TcpStream::connect(addr).await.unwrap();
    let truncated_peer = truncated.local_addr().unwrap();
    truncated.write_all(b"GET /health HTTP/1.1\r\nHo").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(truncated);

    logs.wait_for_line(&format!("unusable request from {truncated_peer}"))
        .await;
    assert!(!logs
        .lines()
        .iter()
        .any(|l| l.contains(&write_failure(truncated_peer))));

    manager.shutdown(Duration::from_secs(1)).await.unwrap();
}
