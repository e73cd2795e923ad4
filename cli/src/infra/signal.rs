//! Maps Ctrl-C onto the shell interrupt token.

use tokio_util::sync::CancellationToken;

/// Cancels `interrupt` on the first Ctrl-C. Ends when the token is cancelled
/// by anyone else.
pub fn forward_ctrl_c(interrupt: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = interrupt.cancelled() => {}
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    tracing::info!("interrupt received, stopping operation");
                    interrupt.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
            },
        }
    });
}
