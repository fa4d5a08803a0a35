use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use super::timer::TimerHandle;

/// Background task that emits one tick per period for a single countdown.
///
/// Dropping the ticker aborts the task. Ticks already queued may still be
/// delivered; the session rejects them as stale.
pub(crate) struct Ticker {
    handle: TimerHandle,
    task: JoinHandle<()>,
}

impl Ticker {
    pub(crate) fn spawn(
        handle: TimerHandle,
        period: Duration,
        ticks: mpsc::UnboundedSender<TimerHandle>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if ticks.send(handle).is_err() {
                    break;
                }
            }
        });
        Self { handle, task }
    }

    pub(crate) fn handle(&self) -> TimerHandle {
        self.handle
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
