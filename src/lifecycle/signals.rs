//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM/SIGINT handlers (Ctrl+C elsewhere)
//! - Translate the first signal into a shutdown trigger
//! - Log and ignore repeats; the drain deadline is never reset

use tokio::task::JoinHandle;

use crate::error::ProbeError;
use crate::lifecycle::Shutdown;

/// Install termination handlers that trigger `shutdown`.
///
/// Handlers are registered before this returns, so a signal delivered right
/// after startup is never lost.
#[cfg(unix)]
pub fn install(shutdown: Shutdown) -> Result<JoinHandle<()>, ProbeError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).map_err(ProbeError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(ProbeError::Signal)?;

    Ok(tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                Some(()) = interrupt.recv() => "SIGINT",
                Some(()) = terminate.recv() => "SIGTERM",
                else => break,
            };
            on_signal(&shutdown, name);
        }
    }))
}

/// Install termination handlers that trigger `shutdown`.
#[cfg(not(unix))]
pub fn install(shutdown: Shutdown) -> Result<JoinHandle<()>, ProbeError> {
    Ok(tokio::spawn(async move {
        loop {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for Ctrl+C");
                break;
            }
            on_signal(&shutdown, "Ctrl+C");
        }
    }))
}

fn on_signal(shutdown: &Shutdown, name: &'static str) {
    if shutdown.trigger() {
        tracing::info!(
            signal = name,
            "Received termination signal, initiating graceful shutdown"
        );
    } else {
        tracing::warn!(
            signal = name,
            "Received termination signal while already shutting down, ignoring"
        );
    }
}
