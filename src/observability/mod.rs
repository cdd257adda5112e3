//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle transitions, signals, connection errors
//!     → tracing events (structured fields)
//! per-request spans (http::request)
//!     → request_id, method, path
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured logging only; no metrics endpoint
//! - Log sink failures are never propagated to the serving path

pub mod logging;
