//! Periodic summary log line

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::counters::CounterStore;

/// Log a totals line every `period` until `shutdown` is cancelled.
///
/// The first line is emitted one full period after start.
pub async fn run_summary_logger(
    counters: Arc<dyn CounterStore>,
    service_name: Arc<str>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Summary logger stopped");
                return;
            }
            _ = ticker.tick() => {
                let snapshot = counters.snapshot();
                info!(
                    orders_processed = snapshot.orders_processed,
                    orders_failed = snapshot.orders_failed,
                    payment_failures = snapshot.payment_failures,
                    out_of_stock_failures = snapshot.out_of_stock_failures,
                    service.name = %service_name,
                    "Periodic log: {} orders processed, {} errors (Payment Failures: {}, Out of Stock: {})",
                    snapshot.orders_processed,
                    snapshot.orders_failed,
                    snapshot.payment_failures,
                    snapshot.out_of_stock_failures
                );
            }
        }
    }
}
