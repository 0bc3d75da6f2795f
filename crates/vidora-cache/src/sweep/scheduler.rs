//! Periodic sweep scheduler.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::store::TtlCache;

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10 * 60),
        }
    }
}

/// Handle for controlling a running sweeper.
///
/// Dropping the handle stops the sweeper.
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signals the sweeper to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Signals the sweeper to stop and waits for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Cache sweeper task failed");
        }
    }

    /// Returns true once the sweeper task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background task removing expired entries from a [`TtlCache`].
pub struct SweepScheduler<V> {
    cache: TtlCache<V>,
    config: SweepConfig,
}

impl<V> SweepScheduler<V>
where
    V: Send + Sync + 'static,
{
    /// Creates a new sweep scheduler.
    ///
    /// A zero interval falls back to the default one.
    pub fn new(cache: TtlCache<V>, mut config: SweepConfig) -> Self {
        if config.interval.is_zero() {
            let fallback = SweepConfig::default().interval;
            warn!("Sweep interval must be non-zero, using {:?}", fallback);
            config.interval = fallback;
        }
        Self { cache, config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Creates a scheduler with default configuration.
    pub fn with_defaults(cache: TtlCache<V>) -> Self {
        Self::new(cache, SweepConfig::default())
    }

    /// Starts the background sweep task on the current Tokio runtime.
    ///
    /// The first sweep runs immediately; the next ones every
    /// `config.interval`.
    pub fn start(self) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));

        SweepHandle {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Runs one sweep synchronously.
    pub fn sweep_now(&self) -> usize {
        self.cache.sweep()
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut timer = interval(self.config.interval);

        info!("Starting cache sweeper with interval {:?}", self.config.interval);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let removed = self.cache.sweep();
                    debug!(removed = removed, remaining = self.cache.len(), "Sweep cycle finished");
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Cache sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::CacheConfig;
    use std::sync::Arc;

    #[test]
    fn test_sweep_config_default() {
        let config = SweepConfig::default();
        assert_eq!(config.interval, Duration::from_secs(600));
    }

    #[test]
    fn test_sweep_now() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u8> = TtlCache::with_clock(CacheConfig::default(), clock.clone());
        cache.set("a", 1, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        let scheduler = SweepScheduler::with_defaults(cache.clone());
        assert_eq!(scheduler.sweep_now(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u8> = TtlCache::with_clock(CacheConfig::default(), clock.clone());
        let config = SweepConfig {
            interval: Duration::from_secs(60),
        };

        let handle = SweepScheduler::new(cache.clone(), config).start();
        // Let the immediate first tick go by on an empty cache.
        tokio::time::sleep(Duration::from_millis(1)).await;

        cache.set("stale", 1, Duration::from_secs(1));
        cache.set("fresh", 2, Duration::from_secs(3600));
        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(cache.keys(), vec!["fresh".to_string()]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_falls_back_to_default() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u8> = TtlCache::with_clock(CacheConfig::default(), clock.clone());
        cache.set("stale", 1, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        let scheduler = SweepScheduler::new(
            cache.clone(),
            SweepConfig {
                interval: Duration::ZERO,
            },
        );
        assert_eq!(scheduler.config().interval, Duration::from_secs(600));

        let handle = scheduler.start();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(cache.is_empty());
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let cache: TtlCache<u8> = TtlCache::new();
        let handle = SweepScheduler::new(cache, SweepConfig::default()).start();

        assert!(!handle.is_finished());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_sweeper() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u8> = TtlCache::with_clock(CacheConfig::default(), clock.clone());
        let config = SweepConfig {
            interval: Duration::from_secs(10),
        };

        let handle = SweepScheduler::new(cache.clone(), config).start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_millis(1)).await;

        cache.set("stale", 1, Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(cache.len(), 1);
    }
}
