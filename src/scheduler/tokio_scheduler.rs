//! Tokio-backed [`Scheduler`], built on `tokio::spawn` + `tokio::time::sleep`.
//! Requires tokio's `time` and `rt` features.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time;

use super::{Handle, Scheduler};
use crate::duration::Duration;

struct TokioHandle {
    cancelled: AtomicBool,
}

impl Handle for TokioHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Schedules each task as a task on the ambient Tokio runtime. Must be
/// constructed from within a running runtime, matching `tokio::spawn`'s own
/// requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> Arc<dyn Handle> {
        let handle = Arc::new(TokioHandle { cancelled: AtomicBool::new(false) });
        let worker_handle = handle.clone();
        tokio::spawn(async move {
            if !delay.is_none() {
                time::sleep(delay.into()).await;
            }
            if !worker_handle.is_cancelled() {
                task();
            }
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_task_after_delay() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        TokioScheduler.schedule(Duration::NONE, Box::new(move || {
            let _ = tx.send(());
        }));
        time::timeout(std::time::Duration::from_secs(1), rx).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn cancel_before_fire_suppresses_task() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = TokioScheduler.schedule(
            Duration::from_millis(200),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        handle.cancel();
        assert!(time::timeout(std::time::Duration::from_millis(400), rx).await.is_err());
    }
}
