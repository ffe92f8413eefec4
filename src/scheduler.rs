//! Periodic refresh timer that can be re-armed without ever running twice.

use std::time::Duration;

use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::logging;

/// Owns the only refresh timer. Changing the period cancels the current
/// interval and starts a new one a full period from now.
pub struct RefreshScheduler {
    period_tx: watch::Sender<Duration>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Spawn the timer task. Ticks that find `ticks` full are dropped, so a
    /// slow consumer sees at most one pending refresh.
    pub fn spawn(period: Duration, ticks: mpsc::Sender<Instant>) -> Self {
        let (period_tx, period_rx) = watch::channel(period);
        let handle = tokio::spawn(run_timer(period_rx, ticks));
        Self { period_tx, handle }
    }

    pub fn period(&self) -> Duration {
        *self.period_tx.borrow()
    }

    /// Returns false when the period is unchanged and the timer keeps its phase.
    pub fn set_period(&self, period: Duration) -> bool {
        self.period_tx.send_if_modified(|current| {
            if *current == period {
                return false;
            }
            *current = period;
            true
        })
    }

    pub async fn stop(self) {
        drop(self.period_tx);
        let _ = self.handle.await;
    }
}

fn arm(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run_timer(mut period_rx: watch::Receiver<Duration>, ticks: mpsc::Sender<Instant>) {
    let mut ticker = arm(*period_rx.borrow_and_update());

    loop {
        tokio::select! {
            fired = ticker.tick() => {
                match ticks.try_send(fired) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        logging::warn_simple("scheduler.skip", "Refresh still pending; skipping tick");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
            changed = period_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *period_rx.borrow_and_update();
                ticker = arm(period);
                logging::info(
                    "scheduler.restart",
                    "Refresh timer restarted",
                    json!({ "period_secs": period.as_secs() }),
                );
            }
        }
    }

    logging::info_simple("scheduler.stop", "Refresh timer stopped");
}
