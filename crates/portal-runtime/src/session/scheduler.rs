//! Deadline scheduling.
//!
//! The session manager never sleeps itself; it hands a task to a
//! [`Scheduler`] and keeps the returned [`TimerHandle`] so the deadline
//! can be cancelled before it fires.
//!
//! | Scheduler | Used by |
//! |-----------|---------|
//! | [`TokioScheduler`] | the running service (one sleeping task per deadline) |
//! | [`ManualTime`](crate::testing::ManualTime) | tests (time moves only on `advance`) |

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Work to run when a deadline elapses.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Runs tasks after a delay.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Cancels a pending task. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&self, handle: TimerHandle);
}

/// [`Scheduler`] that spawns one tokio sleep task per deadline.
///
/// Cancellation aborts the sleeping task.
///
/// # Example
///
/// ```
/// use portal_runtime::session::{Scheduler, TokioScheduler};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = TokioScheduler::current().expect("inside a runtime");
/// let handle = scheduler.schedule(Duration::from_secs(60), Box::new(|| {}));
/// assert_eq!(scheduler.pending(), 1);
///
/// scheduler.cancel(handle);
/// assert_eq!(scheduler.pending(), 0);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
    tasks: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(1)),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a scheduler on the current tokio runtime, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Returns the number of tasks still sleeping.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Held across spawn so the task cannot deregister before it is registered.
        let mut registry = self.tasks.lock();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Deregister first; a fired task is no longer cancellable.
            if tasks.lock().remove(&id).is_some() {
                task();
            }
        });
        registry.insert(id, join);

        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(join) = self.tasks.lock().remove(&handle.0) {
            join.abort();
        }
    }
}
