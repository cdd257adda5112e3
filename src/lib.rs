//! Control-plane liveness probe.
//!
//! A single-purpose HTTP server that answers orchestrator health probes and
//! shuts down within a bounded drain deadline.
//!
//! # Architecture Overview
//!
//! ```text
//!     SIGINT / SIGTERM ──▶ lifecycle::signals ──▶ Shutdown (token)
//!                                                     │
//!                                                     ▼
//!     ┌──────────────────────── LifecycleManager ──────────────────────┐
//!     │                                                                 │
//!     │  Starting ──▶ Serving ──────────────▶ Draining ──▶ Stopped      │
//!     │                 │                        ▲                      │
//!     │                 ▼                        │                      │
//!     │   net::listener ──▶ http::server ──▶ lifecycle::shutdown::Drain │
//!     │                        │                                        │
//!     │                        ▼                                        │
//!     │                  http::routes ──▶ health handlers               │
//!     └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use lifecycle::{LifecycleManager, ServerState, Shutdown};
