use std::fmt;

use anyhow::{Context, Result};
use tokio::signal;

/// What asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Resolve once Ctrl+C or SIGTERM arrives.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn shutdown_signal() -> Result<StopReason> {
    let reason = tokio::select! {
        res = interrupt() => res?,
        res = terminate() => res?,
    };
    tracing::info!(signal = %reason, "Stopping geo-server, draining in-flight requests");
    Ok(reason)
}

async fn interrupt() -> Result<StopReason> {
    signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    Ok(StopReason::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> Result<StopReason> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    sigterm.recv().await;
    Ok(StopReason::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<StopReason> {
    std::future::pending::<Result<StopReason>>().await
}
