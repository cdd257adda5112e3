//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / environment variables
//!     → cli.rs (clap parse, env fallback)
//!     → ProbeConfig (schema.rs)
//!     → validation.rs (semantic checks)
//!     → LifecycleManager (read-only)
//! ```
//!
//! # Design Decisions
//! - No configuration file; every setting is a flag with an env fallback
//! - All fields have defaults so the binary runs with no arguments
//! - Validation reports every problem at once

pub mod cli;
pub mod schema;
pub mod validation;

pub use schema::{
    HealthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProbeConfig, ShutdownConfig,
};
pub use validation::validate_config;
