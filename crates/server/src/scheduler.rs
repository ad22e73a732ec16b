//! Periodic trigger for guarded tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::task::TaskGuard;

/// Trigger `guard` every `period`, starting immediately.
///
/// A run that outlasts the period delays the next tick instead of bursting.
pub fn spawn<T>(guard: Arc<TaskGuard<T>>, period: Duration) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::debug!(period_secs = period.as_secs(), "scheduler tick");
            guard.trigger().await;
        }
    })
}
