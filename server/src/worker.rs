//! Periodic refresh worker.

use std::sync::Arc;
use std::time::Duration;

use coinrate_fx::RateRefresher;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Run refresh passes every `period` until `shutdown` flips to `true`.
///
/// The first pass runs one full period after the call. Passes are awaited
/// inline, so they never overlap and ticks missed while a pass runs are
/// skipped. A pass already in flight when shutdown arrives runs to completion.
/// Failed passes are logged and leave the cache as it was.
pub async fn run_refresh_loop(
    refresher: Arc<RateRefresher>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(period_secs = period.as_secs(), "Refresh worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            result = shutdown.changed() => {
                if result.is_err() {
                    info!("Shutdown channel closed");
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if let Err(e) = refresher.run_pass().await {
            error!(error = %e, "Periodic rate refresh failed");
        }
    }

    info!("Refresh worker stopped");
}
