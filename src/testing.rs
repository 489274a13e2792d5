//! Deterministic test doubles: a virtual clock and a manually-driven
//! scheduler, so the timing-sensitive suites in `tests/` never depend on
//! real sleeps.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::clock::Clock;
use crate::duration::Duration;
use crate::scheduler::{Handle, Scheduler};

/// A [`Clock`] whose `now()` only advances when [`VirtualClock::advance`] is
/// called, so tests can assert on exact elapsed durations.
pub struct VirtualClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self { base: Instant::now(), offset_nanos: AtomicU64::new(0) }
    }

    /// Moves the clock forward by `amount`.
    pub fn advance(&self, amount: Duration) {
        self.offset_nanos.fetch_add(amount.as_nanos(), Ordering::SeqCst);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + std::time::Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

struct PendingTask {
    due_nanos: u64,
    sequence: u64,
    task: Option<Box<dyn FnOnce() + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingTask {
    fn key(&self) -> (std::cmp::Reverse<u64>, std::cmp::Reverse<u64>) {
        (std::cmp::Reverse(self.due_nanos), std::cmp::Reverse(self.sequence))
    }
}

impl PartialEq for PendingTask {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for PendingTask {}
impl PartialOrd for PendingTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PendingTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

struct ManualHandle {
    cancelled: Arc<AtomicBool>,
}

impl Handle for ManualHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A [`Scheduler`] that never spawns threads: tasks queue up keyed by their
/// due time (relative to a [`VirtualClock`]) and only run when a test calls
/// [`ManualScheduler::advance`] or [`ManualScheduler::run_due`].
pub struct ManualScheduler {
    clock: Arc<VirtualClock>,
    queue: Mutex<BinaryHeap<PendingTask>>,
    sequence: AtomicU64,
}

impl ManualScheduler {
    pub fn new(clock: Arc<VirtualClock>) -> Self {
        Self { clock, queue: Mutex::new(BinaryHeap::new()), sequence: AtomicU64::new(0) }
    }

    /// Runs every currently-due, non-cancelled task without moving the
    /// clock.
    pub fn run_due(&self) {
        let now_nanos = Duration::from(self.clock.now().duration_since(self.clock.base)).as_nanos();
        loop {
            let next = {
                let mut queue = self.queue.lock().unwrap();
                match queue.peek() {
                    Some(task) if task.due_nanos <= now_nanos => queue.pop(),
                    _ => None,
                }
            };
            match next {
                Some(mut task) => {
                    if !task.cancelled.load(Ordering::SeqCst) {
                        if let Some(body) = task.task.take() {
                            body();
                        }
                    }
                },
                None => break,
            }
        }
    }

    /// Advances the underlying clock by `amount` and runs every task that
    /// becomes due as a result, in due-time order.
    pub fn advance(&self, amount: Duration) {
        self.clock.advance(amount);
        self.run_due();
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> Arc<dyn Handle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let now_nanos = Duration::from(self.clock.now().duration_since(self.clock.base)).as_nanos();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push(PendingTask {
            due_nanos: now_nanos.saturating_add(delay.as_nanos()),
            sequence,
            task: Some(task),
            cancelled: cancelled.clone(),
        });
        Arc::new(ManualHandle { cancelled })
    }
}
