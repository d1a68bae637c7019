//! Fixed-interval background refresh
//!
//! The task stops when `stop` is called or the `Poller` is dropped, so a
//! view that owns a poller cleans it up simply by going away.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default refresh period for the copy-trading leaderboard
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

pub struct Poller {
    name: String,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Run `tick` now and then every `interval`. Failed ticks are logged and
    /// the loop keeps going.
    pub fn spawn<F, Fut, E>(name: impl Into<String>, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let ticks = Arc::new(AtomicU64::new(0));

        let task_name = name.clone();
        let task_ticks = Arc::clone(&ticks);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if let Err(e) = tick().await {
                    tracing::warn!(poller = %task_name, "Tick error: {}", e);
                }
                task_ticks.fetch_add(1, Ordering::Relaxed);
            }
        });

        tracing::debug!(poller = %name, ?interval, "Poller started");
        Self {
            name,
            ticks,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Completed ticks, successful or not
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(poller = %self.name, "Poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let poller = Poller::spawn("test", Duration::from_secs(30), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        // First tick fires immediately, then one per 30s
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(poller.ticks(), 3);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_stop_loop() {
        let poller = Poller::spawn("failing", Duration::from_secs(1), || async {
            Err::<(), _>("rpc down")
        });
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(poller.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let poller = Poller::spawn("dropped", Duration::from_secs(1), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(poller);

        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_stop() {
        let mut poller = Poller::spawn("stopped", Duration::from_secs(3600), || async {
            Ok::<(), String>(())
        });
        poller.stop();
        assert!(!poller.is_running());
        assert_eq!(poller.name(), "stopped");
    }
}
