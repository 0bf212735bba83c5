//! Signal handling.
//!
//! Ctrl-C and SIGTERM stop the running command instead of killing the
//! process, so the caller can still close the latch and release the
//! hardware.

use std::future::Future;
use tokio::signal;
use tracing::{error, info};

/// Wait for Ctrl-C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, stopping");
        }
        () = terminate => {
            info!("Received SIGTERM, stopping");
        }
    }
}

/// Drive `work` until it finishes or `stop` resolves.
///
/// Returns `None` when stopped. `work` is dropped at that point, which runs
/// the drop guards it holds (an open latch closes).
pub async fn run_until<F, S>(work: F, stop: S) -> Option<F::Output>
where
    F: Future,
    S: Future<Output = ()>,
{
    tokio::select! {
        output = work => Some(output),
        () = stop => None,
    }
}

/// [`run_until`] a shutdown signal.
pub async fn until_signal<F: Future>(work: F) -> Option<F::Output> {
    run_until(work, shutdown_signal()).await
}
