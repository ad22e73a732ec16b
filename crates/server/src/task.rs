//! Single-flight wrapper for background jobs.
//!
//! A [`TaskGuard`] owns a job and an idle/running flag. Triggering while a run
//! is in progress is a no-op, so an overrunning scheduled sync and a manual
//! `sync_run` never execute concurrently. Errors are logged and reported in
//! the outcome, never propagated.

use onesync_core::Error;
use schemars::JsonSchema;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

type JobFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;
type Job<T> = Box<dyn Fn() -> JobFuture<T> + Send + Sync>;

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TaskOutcome<T> {
    Completed(T),
    Failed(String),
    Skipped,
}

pub struct TaskGuard<T> {
    name: &'static str,
    running: AtomicBool,
    job: Job<T>,
}

impl<T> TaskGuard<T> {
    pub fn new<F, Fut>(name: &'static str, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self { name, running: AtomicBool::new(false), job: Box::new(move || Box::pin(job())) }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the job unless a run is already in progress.
    pub async fn trigger(&self) -> TaskOutcome<T> {
        if self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            tracing::warn!(task = self.name, "previous run still in progress, trigger skipped");
            return TaskOutcome::Skipped;
        }
        let _idle = ResetOnDrop(&self.running);

        tracing::info!(task = self.name, "task started");
        match (self.job)().await {
            Ok(value) => {
                tracing::info!(task = self.name, "task completed");
                TaskOutcome::Completed(value)
            }
            Err(e) => {
                tracing::warn!(task = self.name, error = %e, "task failed");
                TaskOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Clears the running flag when the run ends, including by cancellation or panic.
struct ResetOnDrop<'a>(&'a AtomicBool);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
