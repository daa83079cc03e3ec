//! Session lifecycle management.
//!
//! One [`SessionManager`] per client context tracks interaction, arms
//! the idle deadline and forces a logout when it elapses.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     SessionManager                       │
//! │  state, principal snapshot, one pending idle deadline    │
//! └──────────────────────────────────────────────────────────┘
//!        │ now()          │ schedule/cancel      │ ports
//!        ▼                ▼                      ▼
//!   ┌─────────┐     ┌───────────┐    ┌──────────────────────────┐
//!   │  Clock  │     │ Scheduler │    │ AuthProvider             │
//!   └─────────┘     └───────────┘    │ ProfileDirectory         │
//!   SystemClock     TokioScheduler   │ ClientSurface            │
//!   ManualTime      ManualTime       │ DataStore + AccessPolicy │
//!                                    └──────────────────────────┘
//! ```
//!
//! Time and scheduling are injected, so the whole lifecycle runs under
//! [`ManualTime`](crate::testing::ManualTime) in tests without real
//! timers.

mod clock;
mod manager;
mod ports;
mod scheduler;

pub use clock::{Clock, SystemClock};
pub use manager::{
    ActivityEvent, ParseActivityError, SessionManager, SessionPorts, SessionSnapshot,
    SessionState, THEME_COLUMN,
};
pub use ports::{
    Appearance, AuthProvider, AuthUser, ClientSurface, LogoutReason, ParseAppearanceError,
    ProfileDirectory, RedirectTarget,
};
pub use scheduler::{Scheduler, Task, TimerHandle, TokioScheduler};

pub(crate) use clock::add as add_duration;
