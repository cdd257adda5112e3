//! Error taxonomy for the probe.
//!
//! Every error is terminal to the unit of work it occurs in: a single
//! connection (`Write`, `Request`) or the whole process (everything else).
//! Nothing is retried.

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::validation::ValidationErrors;

/// Errors produced by the probe server.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The CLI/env configuration was rejected before anything started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationErrors),

    /// The listener could not be established.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A response was owed but never reached the client; only that connection is lost.
    #[error("failed to write response to {peer}: {source}")]
    Write {
        peer: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The client sent something unparsable, or left before finishing a request.
    #[error("unusable request from {peer}: {source}")]
    Request {
        peer: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The drain deadline elapsed with connections still open.
    #[error("drain deadline of {deadline:?} elapsed with {outstanding} connection(s) still open")]
    ForcedShutdown { deadline: Duration, outstanding: u64 },

    /// The background serve task ended without being asked to.
    #[error("serve task ended unexpectedly: {0}")]
    Serve(String),

    /// OS signal handlers could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

impl ProbeError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProbeError::Write { .. } | ProbeError::Request { .. } => 1,
            ProbeError::Config(_) => 2,
            ProbeError::Bind { .. } => 3,
            ProbeError::ForcedShutdown { .. } => 4,
            ProbeError::Serve(_) => 5,
            ProbeError::Signal(_) => 6,
        }
    }
}
