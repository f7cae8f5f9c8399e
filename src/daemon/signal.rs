//! Termination signal handling.

use std::io;

use tracing::info;

/// Waits for Ctrl-C, or SIGTERM on unix.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be registered.
pub async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received"),
            _ = sigterm.recv() => info!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Ctrl-C received");
    }

    Ok(())
}
