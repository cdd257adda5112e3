//! Health endpoint.
//!
//! Liveness means "the listener is accepting connections": if a request
//! reaches a handler at all, the answer is `{"status":"ok"}`. No dependency
//! is probed and nothing about the request is validated.
//!
//! # Design Decisions
//! - Stateless: a fresh `HealthResponse` per request, no shared data
//! - One endpoint serves both liveness and readiness

mod handler;

pub use handler::{check, root, HealthResponse, ROOT_BODY};
