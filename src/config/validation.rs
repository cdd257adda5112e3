//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap and serde handle syntax)
//! - Reject health paths the router cannot register
//! - Validate value ranges (timeouts > 0, limits > 0 and within the semaphore's capacity)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProbeConfig → Result<(), ValidationErrors>

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use tokio::sync::Semaphore;

use crate::config::schema::ProbeConfig;

/// Largest connection limit the listener's semaphore can hold.
pub const MAX_CONNECTIONS_LIMIT: usize = Semaphore::MAX_PERMITS;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("bind address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("max connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("max connections {0} exceeds the limit of {max}", max = MAX_CONNECTIONS_LIMIT)]
    MaxConnectionsTooLarge(usize),

    #[error("at least one health path is required")]
    NoHealthPaths,

    #[error("health path {0:?} must start with '/'")]
    RelativeHealthPath(String),

    #[error("health path {0:?} must be a literal path without captures or wildcards")]
    PatternHealthPath(String),

    #[error("health path \"/\" conflicts with the root placeholder")]
    RootHealthPath,

    #[error("health path {0:?} is listed more than once")]
    DuplicateHealthPath(String),

    #[error("drain timeout must be greater than zero")]
    ZeroDrainTimeout,
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a configuration before anything is bound.
pub fn validate_config(config: &ProbeConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    } else if config.listener.max_connections > MAX_CONNECTIONS_LIMIT {
        errors.push(ValidationError::MaxConnectionsTooLarge(
            config.listener.max_connections,
        ));
    }

    if config.health.paths.is_empty() {
        errors.push(ValidationError::NoHealthPaths);
    }

    let mut seen = HashSet::new();
    for path in &config.health.paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativeHealthPath(path.clone()));
        } else if path.contains(['{', '}', '*', ':']) {
            errors.push(ValidationError::PatternHealthPath(path.clone()));
        } else if path == "/" && config.health.root_placeholder {
            errors.push(ValidationError::RootHealthPath);
        }

        if !seen.insert(path.as_str()) {
            errors.push(ValidationError::DuplicateHealthPath(path.clone()));
        }
    }

    if config.shutdown.drain_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDrainTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ProbeConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ProbeConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_connections = 0;
        config.shutdown.drain_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ValidationError::InvalidBindAddress("not-an-address".into()),
                ValidationError::ZeroMaxConnections,
                ValidationError::ZeroDrainTimeout,
            ]
        );
    }

    #[test]
    fn rejects_bad_health_paths() {
        let mut config = ProbeConfig::default();
        config.health.paths = vec![
            "health".into(),
            "/status/{id}".into(),
            "/".into(),
            "/healthz".into(),
            "/healthz".into(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ValidationError::RelativeHealthPath("health".into()),
                ValidationError::PatternHealthPath("/status/{id}".into()),
                ValidationError::RootHealthPath,
                ValidationError::DuplicateHealthPath("/healthz".into()),
            ]
        );
    }

    #[test]
    fn root_health_path_allowed_without_placeholder() {
        let mut config = ProbeConfig::default();
        config.health.paths = vec!["/".into()];
        config.health.root_placeholder = false;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn connection_limit_bounded_by_semaphore_capacity() {
        let mut config = ProbeConfig::default();
        config.listener.max_connections = MAX_CONNECTIONS_LIMIT;
        assert_eq!(validate_config(&config), Ok(()));

        config.listener.max_connections = usize::MAX;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.0,
            vec![ValidationError::MaxConnectionsTooLarge(usize::MAX)]
        );

        let rejected = crate::error::ProbeError::from(err);
        assert_eq!(rejected.exit_code(), 2);
    }

    #[test]
    fn empty_health_paths_rejected() {
        let mut config = ProbeConfig::default();
        config.health.paths.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::NoHealthPaths]);
    }

    #[test]
    fn errors_display_joined() {
        let errors = ValidationErrors(vec![
            ValidationError::ZeroMaxConnections,
            ValidationError::ZeroDrainTimeout,
        ]);
        assert_eq!(
            errors.to_string(),
            "max connections must be greater than zero, drain timeout must be greater than zero"
        );
    }
}
