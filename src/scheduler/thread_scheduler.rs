//! Thread-backed [`Scheduler`], the crate's std-only default.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use super::{Handle, Scheduler};
use crate::duration::Duration;

struct ThreadHandle {
    cancelled: AtomicBool,
}

impl Handle for ThreadHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Schedules each task on a dedicated, detached `std::thread` that sleeps
/// for the requested delay before running the task body.
///
/// Cancellation is cooperative: the sleeping thread checks the handle right
/// before invoking `task`, so a task racing its own deadline may still run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> Arc<dyn Handle> {
        let handle = Arc::new(ThreadHandle { cancelled: AtomicBool::new(false) });
        let worker_handle = handle.clone();
        thread::spawn(move || {
            if !delay.is_none() {
                thread::sleep(delay.into());
            }
            if !worker_handle.is_cancelled() {
                task();
            }
        });
        handle
    }
}
