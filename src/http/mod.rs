//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (hyper connection, graceful watcher)
//!     → delivery.rs (owed responses, failure classification)
//!     → request.rs (request ID, request span)
//!     → routes.rs (health paths, root placeholder)
//!     → health handlers
//! ```

pub mod delivery;
pub mod request;
pub mod routes;
pub mod server;

pub use request::X_REQUEST_ID;
pub use routes::build_router;
pub use server::HttpServer;
