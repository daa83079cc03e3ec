//! Test harnesses for session and policy code.
//!
//! - [`ManualTime`]: a [`Clock`] and [`Scheduler`] in one, where time only
//!   moves on [`advance`](ManualTime::advance)
//! - [`TestPorts`]: the in-memory collaborators wired together
//!
//! # Example
//!
//! ```
//! use portal_runtime::session::Scheduler;
//! use portal_runtime::testing::ManualTime;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let time = ManualTime::default();
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&fired);
//! time.schedule(Duration::from_secs(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
//!
//! time.advance(Duration::from_secs(9));
//! assert!(!fired.load(Ordering::SeqCst));
//!
//! time.advance(Duration::from_secs(1));
//! assert!(fired.load(Ordering::SeqCst));
//! assert_eq!(time.pending(), 0);
//! ```

use crate::auth::{DefaultPolicy, ProfileRecord};
use crate::memory::{MemoryAuth, MemoryDirectory, MemoryStore, RecordingSurface};
use crate::session::{add_duration, Clock, Scheduler, SessionPorts, Task, TimerHandle};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use portal_types::ProfileId;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Deterministic clock and scheduler.
///
/// Due tasks run in deadline order during [`advance`](Self::advance),
/// with the clock set to each task's deadline while it runs. Tasks may
/// schedule further tasks; those run too if they fall due before the
/// advance target.
#[derive(Clone)]
pub struct ManualTime {
    inner: Arc<Mutex<ManualInner>>,
}

struct ManualInner {
    now: DateTime<Utc>,
    next_id: u64,
    timers: BTreeMap<u64, (DateTime<Utc>, Task)>,
}

impl ManualTime {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualInner {
                now: start,
                next_id: 1,
                timers: BTreeMap::new(),
            })),
        }
    }

    /// Moves time forward by `by`, running every task that falls due.
    pub fn advance(&self, by: Duration) {
        let target = add_duration(self.inner.lock().now, by);

        loop {
            let due = {
                let mut inner = self.inner.lock();
                let next = inner
                    .timers
                    .iter()
                    .filter(|(_, (deadline, _))| *deadline <= target)
                    .min_by_key(|(id, (deadline, _))| (*deadline, *id))
                    .map(|(id, (deadline, _))| (*id, *deadline));

                match next {
                    Some((id, deadline)) => {
                        inner.now = inner.now.max(deadline);
                        inner.timers.remove(&id).map(|(_, task)| task)
                    }
                    None => None,
                }
            };

            // Run outside the lock so the task can schedule or cancel.
            match due {
                Some(task) => task(),
                None => break,
            }
        }

        let mut inner = self.inner.lock();
        inner.now = inner.now.max(target);
    }

    /// Number of scheduled tasks that have not fired or been cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .timers
            .values()
            .map(|(deadline, _)| *deadline)
            .min()
    }
}

impl Default for ManualTime {
    /// Starts at 2026-01-05 08:00:00 UTC.
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start)
    }
}

impl std::fmt::Debug for ManualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ManualTime")
            .field("now", &inner.now)
            .field("pending", &inner.timers.len())
            .finish()
    }
}

impl Clock for ManualTime {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().now
    }
}

impl Scheduler for ManualTime {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = add_duration(inner.now, delay);
        inner.timers.insert(id, (deadline, task));
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner.lock().timers.remove(&handle.id());
    }
}

/// In-memory collaborators for a session, with handles kept for assertions.
#[derive(Debug, Clone)]
pub struct TestPorts {
    pub auth: Arc<MemoryAuth>,
    pub directory: Arc<MemoryDirectory>,
    pub surface: Arc<RecordingSurface>,
    pub store: Arc<MemoryStore>,
}

impl TestPorts {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth: Arc::new(MemoryAuth::new()),
            directory: Arc::new(MemoryDirectory::new()),
            surface: Arc::new(RecordingSurface::new()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Returns ports wired to [`DefaultPolicy`].
    #[must_use]
    pub fn session_ports(&self) -> SessionPorts {
        SessionPorts {
            auth: self.auth.clone(),
            directory: self.directory.clone(),
            surface: self.surface.clone(),
            store: self.store.clone(),
            policy: Arc::new(DefaultPolicy),
        }
    }

    /// Registers an account and its profile.
    pub fn register(&self, email: &str, password: &str, record: ProfileRecord) -> ProfileId {
        let id = record.id;
        self.auth.register(email, password, id);
        self.directory.insert(record);
        id
    }

    /// Registers a teacher with the given free-text status and no classes.
    pub fn register_teacher(&self, email: &str, password: &str, status: &str) -> ProfileId {
        let record = ProfileRecord::new(ProfileId::new(), "teacher").with_status(status);
        self.register(email, password, record)
    }
}

impl Default for TestPorts {
    fn default() -> Self {
        Self::new()
    }
}
