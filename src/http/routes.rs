//! Routing table.
//!
//! Health paths and the optional root placeholder accept any method. Health
//! responses are marked `no-store` so no intermediary answers a probe from cache.

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::any;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::HealthConfig;
use crate::health;
use crate::http::request::request_span;

/// Build the router for the given health configuration.
///
/// Paths are expected to have passed `validate_config`.
pub fn build_router(config: &HealthConfig) -> Router {
    let health_routes = config
        .paths
        .iter()
        .fold(Router::new(), |router, path| {
            router.route(path, any(health::check))
        })
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let mut router = Router::new().merge(health_routes);
    if config.root_placeholder {
        router = router.route("/", any(health::root));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}
