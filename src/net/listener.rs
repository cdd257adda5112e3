//! TCP listener with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address, failing fast with a bind error
//! - Accept incoming TCP connections
//! - Enforce max_connections via semaphore

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;
use crate::error::ProbeError;

/// A bounded TCP listener that limits concurrent connections.
///
/// When the limit is reached, accepting waits until a slot frees up.
/// Dropping the listener closes the socket; later connection attempts are
/// refused by the OS.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ProbeError> {
        let bind_error = |source| ProbeError::Bind {
            addr: config.bind_address.clone(),
            source,
        };

        if config.max_connections > Semaphore::MAX_PERMITS {
            return Err(bind_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "max connections {} exceeds {}",
                    config.max_connections,
                    Semaphore::MAX_PERMITS
                ),
            )));
        }

        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// The returned permit must be held for the connection's lifetime.
    /// Cancel-safe: dropping the future before a connection arrives loses nothing.
    pub async fn accept(&self) -> io::Result<(TcpStream, SocketAddr, ConnectionPermit)> {
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| io::Error::other("connection limit closed"))?;

        let (stream, addr) = self.inner.accept().await?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// A connection slot. Released when dropped, even if the handler panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}
