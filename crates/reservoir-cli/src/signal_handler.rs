//! Ctrl+C handling

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first Ctrl+C
///
/// The run observes the token between steps and during each engine call,
/// then closes its session normally. Abort the returned handle once the run
/// is over.
pub fn cancel_on_interrupt(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\nInterrupting run... (Ctrl+C)");
                eprintln!("   The engine session will be closed. Please wait...");
                tracing::info!("interrupt received, cancelling run");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl+C"),
        }
    })
}
