//! Command-line and environment configuration.

use clap::Parser;

use crate::config::schema::{
    HealthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProbeConfig, ShutdownConfig,
    DEFAULT_BIND_ADDRESS, DEFAULT_DRAIN_TIMEOUT_MS, DEFAULT_HEALTH_PATHS, DEFAULT_MAX_CONNECTIONS,
};

/// controlplane: liveness probe server for container orchestrators
#[derive(Parser, Debug)]
#[command(name = "controlplane", version, about)]
pub struct Args {
    /// Address to listen on (port 0 picks an ephemeral port)
    #[arg(long, env = "CONTROLPLANE_BIND", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// Path answering health probes; repeat or comma-separate for several
    #[arg(
        long = "health-path",
        env = "CONTROLPLANE_HEALTH_PATHS",
        value_delimiter = ',',
        default_values = DEFAULT_HEALTH_PATHS
    )]
    pub health_paths: Vec<String>,

    /// Do not serve the plain-text placeholder on "/"
    #[arg(long, env = "CONTROLPLANE_NO_ROOT")]
    pub no_root: bool,

    /// Drain deadline for in-flight requests, in milliseconds
    #[arg(long, env = "CONTROLPLANE_DRAIN_TIMEOUT_MS", default_value_t = DEFAULT_DRAIN_TIMEOUT_MS)]
    pub drain_timeout_ms: u64,

    /// Maximum concurrent connections
    #[arg(long, env = "CONTROLPLANE_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// Log output format
    #[arg(long, env = "CONTROLPLANE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log level filter (e.g., "controlplane=debug,tower_http=info")
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Build the runtime configuration from parsed arguments.
    pub fn into_config(self) -> ProbeConfig {
        ProbeConfig {
            listener: ListenerConfig {
                bind_address: self.bind,
                max_connections: self.max_connections,
            },
            health: HealthConfig {
                paths: self.health_paths,
                root_placeholder: !self.no_root,
            },
            shutdown: ShutdownConfig {
                drain_timeout_ms: self.drain_timeout_ms,
            },
            observability: ObservabilityConfig {
                log_format: self.log_format,
                log_filter: self.log_level,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ProbeConfig {
        let argv = std::iter::once("controlplane").chain(args.iter().copied());
        Args::try_parse_from(argv).unwrap().into_config()
    }

    #[test]
    fn no_arguments_matches_defaults() {
        let config = parse(&[]);
        let defaults = ProbeConfig::default();
        assert_eq!(config.listener.bind_address, defaults.listener.bind_address);
        assert_eq!(config.health.paths, defaults.health.paths);
        assert_eq!(config.health.root_placeholder, defaults.health.root_placeholder);
        assert_eq!(config.shutdown.drain_timeout_ms, defaults.shutdown.drain_timeout_ms);
        assert_eq!(config.listener.max_connections, defaults.listener.max_connections);
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--bind",
            "127.0.0.1:9090",
            "--health-path",
            "/livez",
            "--no-root",
            "--drain-timeout-ms",
            "2500",
            "--max-connections",
            "64",
            "--log-format",
            "json",
            "--log-level",
            "controlplane=trace",
        ]);

        assert_eq!(config.listener.bind_address, "127.0.0.1:9090");
        assert_eq!(config.listener.max_connections, 64);
        assert_eq!(config.health.paths, vec!["/livez"]);
        assert!(!config.health.root_placeholder);
        assert_eq!(config.shutdown.drain_timeout_ms, 2500);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(
            config.observability.log_filter.as_deref(),
            Some("controlplane=trace")
        );
    }

    #[test]
    fn health_paths_repeat_and_split() {
        let config = parse(&["--health-path", "/livez,/readyz", "--health-path", "/ping"]);
        assert_eq!(config.health.paths, vec!["/livez", "/readyz", "/ping"]);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = Args::try_parse_from(["controlplane", "--log-format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_deadline() {
        let result = Args::try_parse_from(["controlplane", "--drain-timeout-ms", "soon"]);
        assert!(result.is_err());
    }
}
