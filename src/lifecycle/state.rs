//! Server lifecycle state machine.
//!
//! # State Transitions
//! ```text
//! Starting → Serving:  listener bound, accept loop spawned
//! Serving  → Draining: listener closed after shutdown was requested
//! Draining → Stopped:  every connection finished, or the deadline cut them off
//! Serving  → Stopped:  the serve task died on its own
//! ```

use std::fmt;

use tokio::sync::watch;

/// Lifecycle phase of the server. Ordered: states only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Starting,
    Serving,
    Draining,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Starting => "starting",
            ServerState::Serving => "serving",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Single-writer cell holding the current state.
///
/// Only the lifecycle manager writes; observers get read-only receivers.
#[derive(Debug)]
pub(crate) struct StateCell {
    tx: watch::Sender<ServerState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Starting);
        Self { tx }
    }

    pub(crate) fn get(&self) -> ServerState {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }

    /// Move to `next`, logging the transition. Re-entering the current state is a no-op.
    pub(crate) fn transition(&self, next: ServerState) {
        let previous = self.tx.send_replace(next);
        debug_assert!(next >= previous, "lifecycle moved backwards: {previous} -> {next}");
        if previous != next {
            tracing::info!(from = %previous, to = %next, "Lifecycle transition");
        }
    }
}
