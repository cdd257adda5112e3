//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use controlplane::config::ProbeConfig;
use controlplane::http::build_router;
use controlplane::{LifecycleManager, Shutdown};

/// Route that holds its response for the given time.
pub const SLOW_PATH: &str = "/slow";

/// Config bound to an ephemeral loopback port.
pub fn test_config(drain_timeout: Duration) -> ProbeConfig {
    let mut config = ProbeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.shutdown.drain_timeout_ms = u64::try_from(drain_timeout.as_millis()).unwrap();
    config
}

/// Start a manager serving the default routes.
#[allow(dead_code)]
pub async fn start(config: &ProbeConfig) -> LifecycleManager {
    LifecycleManager::start(config, Shutdown::new())
        .await
        .expect("server failed to start")
}

/// Start a manager whose router also has a `SLOW_PATH` that sleeps for `hold`.
#[allow(dead_code)]
pub async fn start_with_slow_route(config: &ProbeConfig, hold: Duration) -> LifecycleManager {
    let router = build_router(&config.health).merge(Router::new().route(
        SLOW_PATH,
        get(move || async move {
            tokio::time::sleep(hold).await;
            "done"
        }),
    ));

    LifecycleManager::start_with_router(config, router, Shutdown::new())
        .await
        .expect("server failed to start")
}

/// HTTP client that never goes through an env-configured proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

/// Poll `/health` until it answers 200 or give up.
#[allow(dead_code)]
pub async fn wait_until_healthy(addr: SocketAddr) {
    let client = client();
    for _ in 0..100 {
        if let Ok(res) = client.get(url(addr, "/health")).send().await {
            if res.status() == 200 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server at {} never became healthy", addr);
}
