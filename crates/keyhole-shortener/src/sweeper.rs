use keyhole_core::{Clock, Shortener, SystemClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Background task that periodically asks a [`Shortener`] to purge records
/// older than its retention window.
///
/// The first sweep happens one full interval after start. A failed sweep is
/// logged and the loop keeps going.
pub struct Sweeper {
    shortener: Arc<dyn Shortener>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(shortener: Arc<dyn Shortener>, interval: Duration) -> Self {
        Self::with_clock(shortener, interval, SystemClock)
    }

    pub fn with_clock(
        shortener: Arc<dyn Shortener>,
        interval: Duration,
        clock: impl Clock,
    ) -> Self {
        Self {
            shortener,
            clock: Arc::new(clock),
            interval,
        }
    }

    /// Runs one sweep now and returns how many records were removed.
    pub async fn sweep_once(&self) -> usize {
        match self.shortener.sweep(self.clock.now()).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(error = %e, "expiry sweep failed");
                0
            }
        }
    }

    /// Sweeps on every tick until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        info!("expiry sweeper stopped");
    }

    /// Spawns [`run_until`](Self::run_until) onto the runtime.
    pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run_until(shutdown))
    }
}
