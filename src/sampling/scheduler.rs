//! Periodic task glue for the exponent refresh.

use std::time::Duration;
use tokio::task::JoinHandle;

/// A repeating background callback with cancel-on-drop semantics.
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Run `tick` every `period` on the current tokio runtime. The
    /// first run happens one full period after the call.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // a tokio interval fires immediately on the first tick
            interval.tick().await;
            loop {
                interval.tick().await;
                tick();
            }
        });
        Self { handle }
    }

    /// Stop the task. A tick that is already running completes
    /// normally; the abort lands on the next await point.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_every_period() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let _task = PeriodicTask::spawn(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(310)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = PeriodicTask::spawn(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(130)).await;
        task.cancel();
        let ticked = count.load(Ordering::SeqCst);
        assert_eq!(ticked, 2);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = PeriodicTask::spawn(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(70)).await;
        drop(task);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
