//! Server lifecycle manager.
//!
//! Owns the listener's whole life: bind, serve in the background, wait for
//! termination, drain within a deadline.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::http::{build_router, HttpServer};
use crate::lifecycle::shutdown::Drain;
use crate::lifecycle::state::{ServerState, StateCell};
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, Listener};

/// Drives one server instance through `Starting → Serving → Draining → Stopped`.
pub struct LifecycleManager {
    state: StateCell,
    local_addr: SocketAddr,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    serve_task: Option<JoinHandle<Drain>>,
    /// Set when the accept loop finished between polls in `await_termination`.
    closed: Option<Drain>,
}

impl LifecycleManager {
    /// Bind and start serving the health routes described by `config`.
    pub async fn start(config: &ProbeConfig, shutdown: Shutdown) -> Result<Self, ProbeError> {
        let router = build_router(&config.health);
        Self::start_with_router(config, router, shutdown).await
    }

    /// Bind and start serving an arbitrary router.
    ///
    /// Fails with `ProbeError::Bind` if the address is unavailable; nothing
    /// is spawned in that case.
    pub async fn start_with_router(
        config: &ProbeConfig,
        router: Router,
        shutdown: Shutdown,
    ) -> Result<Self, ProbeError> {
        let state = StateCell::new();

        let listener = Listener::bind(&config.listener).await?;
        let server = HttpServer::new(listener, router);
        let local_addr = server.local_addr().map_err(|source| ProbeError::Bind {
            addr: config.listener.bind_address.clone(),
            source,
        })?;
        let tracker = server.tracker();

        let serve_task = tokio::spawn(server.run(shutdown.clone()));
        state.transition(ServerState::Serving);

        Ok(Self {
            state,
            local_addr,
            shutdown,
            tracker,
            serve_task: Some(serve_task),
            closed: None,
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        self.state.get()
    }

    /// Read-only view of state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// The token this manager watches; triggering it ends `await_termination`.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Connections currently open.
    pub fn open_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Suspend until termination is requested.
    ///
    /// Returns `ProbeError::Serve` if the serve task ends on its own first;
    /// the manager is `Stopped` afterwards.
    pub async fn await_termination(&mut self) -> Result<(), ProbeError> {
        let Some(serve_task) = self.serve_task.as_mut() else {
            return Ok(());
        };

        let finished = tokio::select! {
            biased;
            () = self.shutdown.triggered() => None,
            joined = serve_task => Some(joined),
        };

        let Some(joined) = finished else {
            return Ok(());
        };
        self.serve_task = None;

        match joined {
            // The token flipped between the two polls; the loop closed normally.
            Ok(drain) if self.shutdown.is_triggered() => {
                self.closed = Some(drain);
                Ok(())
            }
            Ok(_) => {
                self.state.transition(ServerState::Stopped);
                Err(ProbeError::Serve(
                    "accept loop exited without a shutdown request".to_string(),
                ))
            }
            Err(err) => {
                self.state.transition(ServerState::Stopped);
                tracing::error!(error = %err, "Serve task failed");
                Err(ProbeError::Serve(err.to_string()))
            }
        }
    }

    /// Stop accepting, then drain in-flight connections for at most `deadline`.
    ///
    /// The deadline runs from this call; it is not extended by anything that
    /// happens afterwards. Returns `ProbeError::ForcedShutdown` if connections
    /// had to be cut off. Calling again once stopped does nothing.
    pub async fn shutdown(&mut self, deadline: Duration) -> Result<(), ProbeError> {
        if self.state.get() == ServerState::Stopped {
            tracing::debug!("Shutdown requested but server already stopped");
            return Ok(());
        }

        let started = Instant::now();
        let until = started + deadline;

        if self.shutdown.trigger() {
            tracing::info!(deadline = ?deadline, "Shutdown initiated");
        }

        let drain = match (self.closed.take(), self.serve_task.take()) {
            (Some(drain), _) => drain,
            (None, Some(task)) => match self.close_listener(task, until, deadline).await {
                Ok(drain) => drain,
                Err(err) => {
                    self.state.transition(ServerState::Stopped);
                    return Err(err);
                }
            },
            (None, None) => {
                self.state.transition(ServerState::Stopped);
                return Ok(());
            }
        };

        self.state.transition(ServerState::Draining);
        tracing::info!(
            outstanding = drain.outstanding(),
            deadline = ?deadline,
            "Draining in-flight connections"
        );

        let result = drain.wait_until(until, deadline).await;
        self.state.transition(ServerState::Stopped);

        match &result {
            Ok(()) => tracing::info!(
                elapsed = ?started.elapsed(),
                "Shutdown complete"
            ),
            Err(err) => tracing::warn!(error = %err, "Shutdown forced"),
        }
        result
    }

    /// Wait for the accept loop to drop the listener and hand back its connections.
    async fn close_listener(
        &self,
        mut task: JoinHandle<Drain>,
        until: Instant,
        deadline: Duration,
    ) -> Result<Drain, ProbeError> {
        match tokio::time::timeout_at(until, &mut task).await {
            Ok(Ok(drain)) => Ok(drain),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Serve task failed during shutdown");
                Err(ProbeError::Serve(err.to_string()))
            }
            Err(_) => {
                // Aborting the accept loop drops its connection set, which
                // aborts every connection task with it.
                let outstanding = self.tracker.active_count();
                task.abort();
                let _ = task.await;
                Err(ProbeError::ForcedShutdown {
                    deadline,
                    outstanding,
                })
            }
        }
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        if let Some(task) = self.serve_task.take() {
            task.abort();
        }
    }
}
