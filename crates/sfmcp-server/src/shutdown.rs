//! Signal handling for the stdio server.

use tokio::signal;
use tracing::{error, info};

/// Completes when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
///
/// If a handler cannot be installed, that signal is logged and ignored.
///
/// ```no_run
/// # async fn run(server: sfmcp_server::McpServer) {
/// tokio::select! {
///     result = server.serve_stdio() => { let _ = result; }
///     _ = sfmcp_server::shutdown_signal() => {}
/// }
/// # }
/// ```
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
