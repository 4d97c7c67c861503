//! Background task plumbing shared by the reconciliation worker and any
//! future periodic job: a `Maintaining` implementor is driven on a fixed
//! interval until a process-wide [`CancellationToken`] fires.
use anyhow::Result;
use futures::FutureExt;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
pub use tokio_util::sync::CancellationToken;

#[async_trait::async_trait]
pub trait Maintaining: Send + Sync {
    /// Runs one sweep. Errors are logged by the driver loop and never stop
    /// the loop itself.
    async fn run_maintenance(&self) -> Result<()>;

    /// Human-readable name used in log lines.
    fn name(&self) -> &str;
}

/// Drives `maintaining` on `interval` until `cancellation` fires. Panics
/// inside a single sweep are caught and logged so one bad iteration cannot
/// take down the whole task.
pub async fn run_forever(
    maintaining: impl Maintaining,
    interval: Duration,
    cancellation: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                tracing::info!(task = maintaining.name(), "cancellation requested, exiting");
                return;
            }
            _ = ticker.tick() => {}
        }
        let result = std::panic::AssertUnwindSafe(maintaining.run_maintenance())
            .catch_unwind()
            .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(task = maintaining.name(), ?err, "maintenance sweep failed")
            }
            Err(panic) => {
                tracing::error!(
                    task = maintaining.name(),
                    ?panic,
                    "maintenance sweep panicked"
                )
            }
        }
    }
}
