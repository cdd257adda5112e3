//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (manager.rs):
//!     Validate config → Bind listener → Spawn accept loop → Serving
//!
//! Termination (signals.rs, shutdown.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → await_termination returns
//!
//! Shutdown (manager.rs, shutdown.rs):
//!     Stop accepting → Draining → Drain connections (deadline) → Stopped
//! ```
//!
//! # Design Decisions
//! - No global state: one manager owns the state, the token and the serve task
//! - Termination is a token, so tests trigger it without real signals
//! - Stop accepting strictly precedes the drain wait
//! - Shutdown has a deadline: connections still open after it are aborted

pub mod manager;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use manager::LifecycleManager;
pub use shutdown::{Drain, Shutdown};
pub use state::ServerState;
