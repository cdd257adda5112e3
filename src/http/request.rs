//! Per-request tracing.
//!
//! Every request gets an `x-request-id` (kept if the client sent one) and a
//! span carrying it, so log lines from one probe can be correlated.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

/// Header carrying the request ID, in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Build the root span for a request.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
