use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};

/// Cadence at which a running session is ticked.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic tick source for a session in progress.
///
/// Ticks arrive on a channel the owner polls alongside user input. The
/// background task is aborted by `stop` or on drop, so no tick can reach a
/// session after its owner is gone.
#[derive(Debug)]
pub struct Countdown {
    period: Duration,
    ticks: mpsc::Receiver<()>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Start ticking every `period`. The first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            period,
            ticks,
            task: Some(task),
        }
    }

    /// Begin a fresh period from now, dropping any tick already queued.
    ///
    /// Call this whenever the question changes so its first tick lands a
    /// full period later.
    pub fn restart(&mut self) {
        *self = Self::start(self.period);
    }

    /// Wait for the next tick. Returns `None` once stopped.
    pub async fn tick(&mut self) -> Option<()> {
        if self.task.is_none() {
            return None;
        }
        self.ticks.recv().await
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.ticks.close();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}
