//! Configuration schema definitions.
//!
//! The structure mirrors the subsystems that consume it. Every section has a
//! `Default` so a bare `ProbeConfig::default()` is a runnable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default listen address (all interfaces, port 8080).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Paths answered by the health handler unless overridden.
pub const DEFAULT_HEALTH_PATHS: [&str; 2] = ["/health", "/healthz"];

/// Drain deadline; shorter than typical orchestrator kill timeouts.
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 10_000;

/// Maximum concurrent connections (backpressure).
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Log filter used when neither the CLI nor RUST_LOG provide one.
pub const DEFAULT_LOG_FILTER: &str = "controlplane=info,tower_http=info";

/// Root configuration for the probe.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Health endpoint routing.
    pub health: HealthConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080"). Port 0 picks an ephemeral port.
    pub bind_address: String,

    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Paths that answer with the health payload.
    pub paths: Vec<String>,

    /// Serve the plain-text placeholder on `/`.
    pub root_placeholder: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            paths: DEFAULT_HEALTH_PATHS.iter().map(|p| p.to_string()).collect(),
            root_placeholder: true,
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time allowed for in-flight connections to finish, in milliseconds.
    pub drain_timeout_ms: u64,
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Explicit tracing filter; falls back to RUST_LOG, then DEFAULT_LOG_FILTER.
    pub log_filter: Option<String>,
}
