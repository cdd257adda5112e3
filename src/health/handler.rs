use axum::Json;
use serde::Serialize;

/// Body of the root placeholder route.
pub const ROOT_BODY: &str = "controlplane OK\n";

/// Wire body of every health reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Health probe handler. Method, headers and body are ignored.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Placeholder for `/`.
pub async fn root() -> &'static str {
    ROOT_BODY
}
