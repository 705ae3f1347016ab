//! # Process termination signals.
//!
//! [`wait_for_shutdown_signal`] completes when the process is asked to exit,
//! which is what [`Manager::run_until_shutdown_signal`](crate::Manager::run_until_shutdown_signal)
//! waits on before stopping the fleet.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Elsewhere:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

/// Waits for a termination signal.
///
/// Fails if a signal listener cannot be registered.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    tracing::debug!(signal = name, "termination signal observed");
    Ok(())
}

/// Waits for a termination signal.
///
/// Fails if the Ctrl-C listener cannot be registered.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::debug!(signal = "ctrl-c", "termination signal observed");
    Ok(())
}
