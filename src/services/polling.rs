//! Fixed-interval background polling.
//!
//! A poller runs its tick immediately, then once per period, until its
//! [`PollingHandle`] is stopped or dropped, or the tick asks to stop.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Owns a running poller. Dropping the handle cancels it.
#[derive(Debug)]
pub struct PollingHandle {
    name: &'static str,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollingHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Cancel the poller and wait for its task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(poller = self.name, error = %e, "Poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn `tick` every `period`, starting immediately.
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollingHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        tracing::debug!(poller = name, period_ms = period.as_millis() as u64, "Poller started");

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(poller = name, "Poller cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if tick().await.is_break() {
                        tracing::debug!(poller = name, "Poller target gone, stopping");
                        break;
                    }
                }
            }
        }
    });

    PollingHandle {
        name,
        cancel,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_poller(period: Duration, limit: Option<usize>) -> (PollingHandle, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let handle = spawn_periodic("test", period, move || {
            let counter = counter.clone();
            async move {
                let seen = counter.fetch_add(1, Ordering::SeqCst) + 1;
                match limit {
                    Some(limit) if seen >= limit => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            }
        });
        (handle, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_immediately_then_on_interval() {
        let (handle, ticks) = counting_poller(Duration::from_secs(30), None);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_poller() {
        let (handle, ticks) = counting_poller(Duration::from_secs(30), None);
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_stops_poller() {
        let (handle, ticks) = counting_poller(Duration::from_secs(10), Some(2));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }
}
