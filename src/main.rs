use std::process::ExitCode;

use clap::Parser;

use controlplane::config::cli::Args;
use controlplane::config::{validate_config, ProbeConfig};
use controlplane::lifecycle::signals;
use controlplane::observability::logging;
use controlplane::{LifecycleManager, ProbeError, Shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Args::parse().into_config();
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "controlplane starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("controlplane stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                exit_code = err.exit_code(),
                "controlplane exiting with failure"
            );
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(config: ProbeConfig) -> Result<(), ProbeError> {
    validate_config(&config)?;
    tracing::info!(
        config = %serde_json::to_string(&config).unwrap_or_default(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let _signals = signals::install(shutdown.clone())?;

    let mut manager = LifecycleManager::start(&config, shutdown).await?;
    tracing::info!(address = %manager.local_addr(), "Listening for probes");

    manager.await_termination().await?;
    manager.shutdown(config.shutdown.drain_timeout()).await
}
