//! Response delivery tracking.
//!
//! A connection that dies while a handler is still producing its response
//! owes the client a response it will never get: that is a write failure.
//! A connection that dies before a full request arrived, or on garbage
//! input, is the client's problem and is logged as a request error.

use std::convert::Infallible;
use std::error::Error;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use axum::response::Response;
use axum::Router;
use hyper::body::Incoming;
use tower::{Service, ServiceExt};

use crate::error::ProbeError;

/// Per-connection record of responses that were started but never finished.
#[derive(Debug, Clone, Default)]
pub struct PendingResponses {
    abandoned: Arc<AtomicBool>,
}

impl PendingResponses {
    /// Mark a response as owed until the returned guard is completed.
    pub fn begin(&self) -> PendingResponse {
        PendingResponse {
            abandoned: Arc::clone(&self.abandoned),
            completed: false,
        }
    }

    /// Whether any response was dropped before the handler produced it.
    pub fn abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }
}

/// A response being produced. Dropping it uncompleted marks it abandoned.
#[derive(Debug)]
pub struct PendingResponse {
    abandoned: Arc<AtomicBool>,
    completed: bool,
}

impl PendingResponse {
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if !self.completed {
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

/// Router wrapper that records every request in a connection's `PendingResponses`.
#[derive(Clone)]
pub struct TrackedRouter {
    router: Router,
    pending: PendingResponses,
}

impl TrackedRouter {
    pub fn new(router: Router, pending: PendingResponses) -> Self {
        Self { router, pending }
    }
}

impl Service<Request<Incoming>> for TrackedRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Incoming>) -> Self::Future {
        let pending = self.pending.begin();
        let router = self.router.clone();
        Box::pin(async move {
            let response = router.oneshot(request).await;
            pending.complete();
            response
        })
    }
}

/// Sort a failed connection into a write failure or a request failure.
///
/// Parse errors are always the client's. Otherwise the failure is a write
/// failure if a response was abandoned or the socket refused a write.
pub fn classify_failure(
    peer: SocketAddr,
    source: Box<dyn Error + Send + Sync>,
    abandoned: bool,
) -> ProbeError {
    let malformed = source
        .downcast_ref::<hyper::Error>()
        .is_some_and(|err| err.is_parse() || err.is_parse_status());
    let broken_pipe = io_error_kind(source.as_ref()) == Some(io::ErrorKind::BrokenPipe);

    if !malformed && (abandoned || broken_pipe) {
        ProbeError::Write { peer, source }
    } else {
        ProbeError::Request { peer, source }
    }
}

fn io_error_kind(err: &(dyn Error + 'static)) -> Option<io::ErrorKind> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
