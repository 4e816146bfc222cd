use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Bridges an interrupt signal into cooperative cancellation of the tracker.
///
/// The loop only checks the token between samples, so a ctrl-c never
/// interrupts an append mid-write.
pub async fn cancel_on_interrupt(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received");
            cancelation.cancel();
        },
    };
}
