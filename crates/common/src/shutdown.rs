//! Termination signal handling.

use tokio::signal;
use tracing::error;

/// Resolve once the process receives SIGINT (Ctrl+C) or, on unix, SIGTERM.
///
/// Returns the name of the signal that fired. If a handler cannot be
/// installed the corresponding branch never resolves, so the other one still
/// works.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
