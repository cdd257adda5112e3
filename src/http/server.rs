//! HTTP server accept loop.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener until shutdown
//! - Serve each connection on its own task (HTTP/1.1 and HTTP/2)
//! - Log connection failures without disturbing other connections: an
//!   undelivered response is a write failure, a bad request is not
//! - Close the listener before handing off to the drain phase

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::error::ProbeError;
use crate::http::delivery::{classify_failure, PendingResponses, TrackedRouter};
use crate::lifecycle::shutdown::Drain;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, Listener};

/// Pause after a failed accept (e.g. out of file descriptors) before retrying.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// HTTP server bound to a listener.
pub struct HttpServer {
    listener: Listener,
    router: Router,
    tracker: ConnectionTracker,
}

impl HttpServer {
    pub fn new(listener: Listener, router: Router) -> Self {
        Self {
            listener,
            router,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Shared view of the live connection count.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until `shutdown` is triggered.
    ///
    /// The listener is dropped before this returns, so by the time the caller
    /// holds the `Drain` no new connection can be admitted.
    pub async fn run(self, shutdown: Shutdown) -> Drain {
        let HttpServer {
            listener,
            router,
            tracker,
        } = self;

        let builder = Builder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut connections = JoinSet::new();

        tracing::debug!(
            max_connections = listener.max_connections(),
            "Accept loop started"
        );

        loop {
            let accepted = tokio::select! {
                biased;
                () = shutdown.triggered() => break,
                accepted = listener.accept() => accepted,
            };

            // Reap finished connection tasks so the set does not grow unbounded.
            while connections.try_join_next().is_some() {}

            let (stream, peer, permit) = match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            let guard = tracker.track();
            let connection_id = guard.id();
            let pending = PendingResponses::default();
            let service =
                TowerToHyperService::new(TrackedRouter::new(router.clone(), pending.clone()));
            let conn = builder
                .serve_connection_with_upgrades(TokioIo::new(stream), service)
                .into_owned();
            let conn = graceful.watch(conn);

            let span = tracing::debug_span!("connection", id = %connection_id, peer = %peer);
            connections.spawn(
                async move {
                    let _permit = permit;
                    let _guard = guard;
                    // The connection future, and any handler it was still
                    // running, is gone once this returns.
                    let Err(source) = conn.await else {
                        return;
                    };
                    match classify_failure(peer, source, pending.abandoned()) {
                        err @ ProbeError::Write { .. } => {
                            tracing::warn!(
                                error = %err,
                                "Connection failed, response not delivered"
                            );
                        }
                        err => {
                            tracing::debug!(
                                error = %err,
                                "Connection closed without a usable request"
                            );
                        }
                    }
                }
                .instrument(span),
            );
        }

        let free_slots = listener.available_permits();
        drop(listener);
        tracing::info!(
            open_connections = tracker.active_count(),
            free_slots,
            "Listener closed, no longer accepting connections"
        );

        Drain::new(graceful, connections, tracker)
    }
}
