//! Shutdown coordination.
//!
//! `Shutdown` is the cancellation token every long-running task watches.
//! `Drain` is what remains once the listener has closed: the live connection
//! tasks, waited on up to a deadline and aborted past it.

use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::error::ProbeError;
use crate::net::ConnectionTracker;

/// Cancellation token for graceful shutdown.
///
/// Cloning is cheap and every clone observes the same trigger. Triggering
/// is one-way: once set it stays set.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the shutdown signal.
    ///
    /// Returns `true` only for the call that actually flipped the token, so
    /// repeated signals can be told apart from the first one.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the token is triggered; immediately if it already is.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// In-flight connections left after the listener closed.
pub struct Drain {
    graceful: GracefulShutdown,
    connections: JoinSet<()>,
    tracker: ConnectionTracker,
}

impl Drain {
    pub(crate) fn new(
        graceful: GracefulShutdown,
        connections: JoinSet<()>,
        tracker: ConnectionTracker,
    ) -> Self {
        Self {
            graceful,
            connections,
            tracker,
        }
    }

    /// Connections still open.
    pub fn outstanding(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Ask every connection to finish its current request and close, waiting
    /// until `until`. Connections still open then are aborted.
    ///
    /// `budget` is the configured deadline, reported in the error.
    pub async fn wait_until(self, until: Instant, budget: Duration) -> Result<(), ProbeError> {
        let Drain {
            graceful,
            mut connections,
            tracker,
        } = self;

        let drained = tokio::time::timeout_at(until, async {
            graceful.shutdown().await;
            while connections.join_next().await.is_some() {}
        })
        .await;

        if drained.is_ok() {
            tracing::info!("All connections drained");
            return Ok(());
        }

        let outstanding = tracker.active_count();
        tracing::warn!(
            outstanding,
            deadline = ?budget,
            "Drain deadline elapsed, closing remaining connections"
        );
        connections.abort_all();
        while connections.join_next().await.is_some() {}

        Err(ProbeError::ForcedShutdown {
            deadline: budget,
            outstanding,
        })
    }
}
