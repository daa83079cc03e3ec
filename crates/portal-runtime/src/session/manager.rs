//! Session lifecycle state machine.
//!
//! ```text
//!                    start / sign_in
//!  Unauthenticated ───────────────────► Active ◄──┐ record_activity
//!        ▲                               │  │     │ (reschedule deadline)
//!        │ stop                          │  └─────┘
//!        │                 deadline fires│        │ logout /
//!        │                               ▼        ▼ external sign-out
//!        └──────────────────────── IdleTimedOut   LoggedOut
//! ```
//!
//! At most one idle deadline is pending at any time. Every reschedule
//! cancels the previous deadline and bumps a generation counter, so a
//! deadline that fires after being superseded is ignored.

use super::clock::{self, Clock};
use super::ports::{
    Appearance, AuthProvider, ClientSurface, LogoutReason, ProfileDirectory, RedirectTarget,
};
use super::scheduler::{Scheduler, TimerHandle};
use crate::auth::IdentityResolver;
use crate::config::SessionConfig;
use crate::store::{DataStore, ScopedStore};
use crate::PortalError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use portal_auth::{AccessPolicy, RowContext};
use portal_types::{Collection, Operation, Principal, ProfileId};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Settings column holding the appearance preference.
pub const THEME_COLUMN: &str = "theme";

/// A monitored user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEvent {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
}

impl ActivityEvent {
    /// All monitored interactions.
    pub const ALL: [Self; 5] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
    ];

    /// Returns the DOM event name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::PointerMove => "mousemove",
            Self::KeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
        }
    }
}

impl std::fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`ActivityEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a monitored activity event: '{0}'")]
pub struct ParseActivityError(pub String);

impl FromStr for ActivityEvent {
    type Err = ParseActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mousedown" | "pointerdown" => Ok(Self::PointerDown),
            "mousemove" | "pointermove" => Ok(Self::PointerMove),
            "keypress" | "keydown" => Ok(Self::KeyPress),
            "scroll" => Ok(Self::Scroll),
            "touchstart" => Ok(Self::TouchStart),
            _ => Err(ParseActivityError(s.to_string())),
        }
    }
}

/// Lifecycle state of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Active,
    IdleTimedOut,
    LoggedOut,
}

impl SessionState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Active => "active",
            Self::IdleTimedOut => "idle_timed_out",
            Self::LoggedOut => "logged_out",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub last_activity: Option<DateTime<Utc>>,
    pub idle_deadline: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Collaborators a [`SessionManager`] talks to.
#[derive(Clone)]
pub struct SessionPorts {
    pub auth: Arc<dyn AuthProvider>,
    pub directory: Arc<dyn ProfileDirectory>,
    pub surface: Arc<dyn ClientSurface>,
    pub store: Arc<dyn DataStore>,
    pub policy: Arc<dyn AccessPolicy>,
}

/// Owns the one session of a client context.
///
/// Dropping the manager detaches it: the pending deadline is cancelled
/// and no sign-out is issued.
///
/// # Example
///
/// ```
/// use portal_runtime::config::SessionConfig;
/// use portal_runtime::session::{SessionManager, SessionState};
/// use portal_runtime::testing::{ManualTime, TestPorts};
/// use portal_types::{Principal, ProfileId};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let time = ManualTime::default();
/// let ports = TestPorts::new();
/// let manager = SessionManager::new(
///     &SessionConfig::default(),
///     ports.session_ports(),
///     Arc::new(time.clone()),
///     Arc::new(time.clone()),
/// );
///
/// manager.start(Principal::Admin { id: ProfileId::new() }).unwrap();
/// assert_eq!(manager.state(), SessionState::Active);
///
/// time.advance(Duration::from_secs(30 * 60));
/// assert_eq!(manager.state(), SessionState::IdleTimedOut);
/// assert_eq!(ports.auth.sign_out_calls(), 1);
/// ```
pub struct SessionManager {
    shared: Arc<Shared>,
}

struct Shared {
    ports: SessionPorts,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    idle_timeout: Duration,
    activity_throttle: Duration,
    login_path: String,
    inner: Mutex<Inner>,
}

struct Inner {
    state: SessionState,
    principal: Principal,
    last_activity: Option<DateTime<Utc>>,
    idle_deadline: Option<DateTime<Utc>>,
    armed_at: Option<DateTime<Utc>>,
    timer: Option<TimerHandle>,
    generation: u64,
    ended: Option<LogoutReason>,
}

impl SessionManager {
    pub fn new(
        config: &SessionConfig,
        ports: SessionPorts,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                ports,
                clock,
                scheduler,
                idle_timeout: config.idle_timeout(),
                activity_throttle: config.activity_throttle(),
                login_path: config.login_path.clone(),
                inner: Mutex::new(Inner {
                    state: SessionState::Unauthenticated,
                    principal: Principal::Anonymous,
                    last_activity: None,
                    idle_deadline: None,
                    armed_at: None,
                    timer: None,
                    generation: 0,
                    ended: None,
                }),
            }),
        }
    }

    /// Authenticates with the identity service and starts the session.
    ///
    /// # Errors
    ///
    /// The identity service's error, the directory's error, or
    /// [`PortalError::AuthorizationDenied`] when the user has no usable
    /// profile. In the last case the identity session is signed out again.
    ///
    /// Once the identity service accepts the credentials, any session
    /// already active here is detached; it never outlives a failed
    /// replacement.
    pub fn sign_in(&self, email: &str, password: &SecretString) -> Result<Principal, PortalError> {
        let user = self
            .shared
            .ports
            .auth
            .sign_in_with_credentials(email, password)?;

        {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_active() {
                let previous = self.shared.end(
                    &mut inner,
                    SessionState::Unauthenticated,
                    LogoutReason::Detached,
                );
                debug!(principal = %previous, "sign-in replaces active session");
            }
        }

        let principal = self.shared.resolve(&user.id)?;

        if let Err(err) = self.start(principal.clone()) {
            if let Err(sign_out_err) = self.shared.ports.auth.sign_out() {
                warn!(error = %sign_out_err, "sign-out after rejected sign-in failed");
            }
            return Err(err);
        }

        Ok(principal)
    }

    /// Enters `Active` for `principal` and arms the idle deadline.
    ///
    /// Restarting an active session replaces its deadline. The stored
    /// appearance preference is applied once; failures there are logged
    /// and do not fail the start.
    ///
    /// # Errors
    ///
    /// [`PortalError::AuthorizationDenied`] for an anonymous principal.
    pub fn start(&self, principal: Principal) -> Result<(), PortalError> {
        // Starting reads the principal's own settings; anonymous is rejected here.
        self.shared.ports.policy.check(
            &principal,
            Collection::Settings,
            Operation::Read,
            &RowContext::new(),
        )?;

        let now = self.shared.clock.now();
        {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_active() {
                debug!(principal = %inner.principal, "restarting active session");
            }
            inner.state = SessionState::Active;
            inner.principal = principal.clone();
            inner.ended = None;
            inner.last_activity = Some(now);
            inner.idle_deadline = Some(clock::add(now, self.shared.idle_timeout));
            self.shared.arm(&mut inner, now, self.shared.idle_timeout);
        }

        info!(
            principal = %principal,
            idle_timeout_secs = self.shared.idle_timeout.as_secs(),
            "session started"
        );
        self.shared.sync_appearance(principal);
        Ok(())
    }

    /// Resets the idle deadline after a user interaction.
    ///
    /// A no-op unless the session is active. Reschedules happen at most
    /// once per throttle window; the deadline itself always moves.
    pub fn record_activity(&self, event: ActivityEvent) {
        let now = self.shared.clock.now();
        let mut inner = self.shared.inner.lock();

        if !inner.state.is_active() {
            trace!(event = %event, state = %inner.state, "activity ignored");
            return;
        }

        inner.last_activity = Some(now);
        inner.idle_deadline = Some(clock::add(now, self.shared.idle_timeout));

        let throttled = inner
            .armed_at
            .is_some_and(|armed| clock::until(armed, now) < self.shared.activity_throttle);
        if throttled {
            trace!(event = %event, "activity inside throttle window");
            return;
        }

        self.shared.arm(&mut inner, now, self.shared.idle_timeout);
    }

    /// Ends the session at the user's request.
    ///
    /// Signs out and redirects to the login path without a reason.
    /// Sign-out failures are logged; local state is cleared regardless.
    pub fn logout(&self) {
        let principal = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.is_active() {
                debug!(state = %inner.state, "logout ignored");
                return;
            }
            self.shared
                .end(&mut inner, SessionState::LoggedOut, LogoutReason::UserRequested)
        };

        info!(principal = %principal, "user logged out");
        self.shared.sign_out_and_redirect(None, true);
    }

    /// Reacts to a sign-out performed by another client context.
    ///
    /// Clears local state and redirects, without signing out again.
    pub fn observe_external_sign_out(&self) {
        let principal = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.is_active() {
                return;
            }
            self.shared.end(
                &mut inner,
                SessionState::LoggedOut,
                LogoutReason::SignedOutElsewhere,
            )
        };

        info!(principal = %principal, "signed out in another client context");
        self.shared.sign_out_and_redirect(None, false);
    }

    /// Re-reads role and status from the profile directory.
    ///
    /// A changed status (e.g. a teacher going on leave) takes effect
    /// immediately. A changed role ends the session, since a role is
    /// fixed for the lifetime of a session.
    ///
    /// # Errors
    ///
    /// [`PortalError::SessionExpired`] if no session is active or the role
    /// changed; the directory's error otherwise, leaving the session as is.
    pub fn refresh_principal(&self) -> Result<Principal, PortalError> {
        let current = {
            let inner = self.shared.inner.lock();
            Shared::require_active(&inner)?;
            inner.principal.clone()
        };
        let Some(id) = current.id().copied() else {
            return Err(PortalError::session_expired(LogoutReason::Detached));
        };

        let refreshed = self.shared.resolve(&id)?;

        let mut inner = self.shared.inner.lock();
        Shared::require_active(&inner)?;
        if inner.principal.id() != Some(&id) {
            // Replaced while the directory was queried.
            debug!(principal = %inner.principal, "refresh outlived its session");
            return Err(PortalError::session_expired(LogoutReason::Detached));
        }

        if refreshed.role() != current.role() {
            warn!(
                principal = %current,
                role = %refreshed.role(),
                "role changed mid-session, ending session"
            );
            self.shared.end(
                &mut inner,
                SessionState::LoggedOut,
                LogoutReason::ProfileChanged,
            );
            drop(inner);
            self.shared.sign_out_and_redirect(None, true);
            return Err(PortalError::session_expired(LogoutReason::ProfileChanged));
        }

        inner.principal = refreshed.clone();
        debug!(
            principal = %refreshed,
            on_leave = refreshed.is_on_leave(),
            "principal refreshed"
        );
        Ok(refreshed)
    }

    /// Returns a policy-enforcing store view for the active principal.
    ///
    /// # Errors
    ///
    /// [`PortalError::SessionExpired`] once the session has ended.
    pub fn scoped_store(&self) -> Result<ScopedStore, PortalError> {
        let inner = self.shared.inner.lock();
        Shared::require_active(&inner)?;
        Ok(ScopedStore::new(
            Arc::clone(&self.shared.ports.store),
            Arc::clone(&self.shared.ports.policy),
            inner.principal.clone(),
        ))
    }

    /// Detaches the session context.
    ///
    /// Cancels the pending deadline and returns to `Unauthenticated`
    /// without signing out.
    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state.is_active() {
            self.shared
                .end(&mut inner, SessionState::Unauthenticated, LogoutReason::Detached);
            debug!("session context detached");
        } else {
            self.shared.disarm(&mut inner);
            inner.state = SessionState::Unauthenticated;
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state
    }

    /// Returns the current principal (`Anonymous` when no session is active).
    #[must_use]
    pub fn principal(&self) -> Principal {
        self.shared.inner.lock().principal.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.inner.lock();
        SessionSnapshot {
            state: inner.state,
            last_activity: inner.last_activity,
            idle_deadline: inner.idle_deadline,
            active: inner.state.is_active(),
        }
    }

    /// Returns `true` while an idle deadline is scheduled.
    #[must_use]
    pub fn has_pending_deadline(&self) -> bool {
        self.shared.inner.lock().timer.is_some()
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.shared.idle_timeout
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// Replaces the pending deadline with one `delay` from `now`.
    fn arm(self: &Arc<Self>, inner: &mut Inner, now: DateTime<Utc>, delay: Duration) {
        self.disarm(inner);

        let generation = inner.generation;
        let weak = Arc::downgrade(self);
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_deadline(generation);
                }
            }),
        );

        inner.timer = Some(handle);
        inner.armed_at = Some(now);
    }

    fn disarm(&self, inner: &mut Inner) {
        if let Some(handle) = inner.timer.take() {
            self.scheduler.cancel(handle);
        }
        inner.generation = inner.generation.wrapping_add(1);
        inner.armed_at = None;
    }

    fn on_deadline(self: &Arc<Self>, generation: u64) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        if generation != inner.generation || !inner.state.is_active() {
            debug!(generation, "stale idle deadline ignored");
            return;
        }
        inner.timer = None;

        // Activity inside the throttle window moved the deadline without
        // rescheduling; wait out the remainder.
        if let Some(deadline) = inner.idle_deadline.filter(|d| *d > now) {
            let remaining = clock::until(now, deadline);
            trace!(remaining_ms = remaining.as_millis() as u64, "idle deadline moved");
            self.arm(&mut inner, now, remaining);
            return;
        }

        let principal = self.end(&mut inner, SessionState::IdleTimedOut, LogoutReason::Inactivity);
        drop(inner);

        info!(principal = %principal, "idle timeout, signing out");
        self.sign_out_and_redirect(Some(LogoutReason::Inactivity), true);
    }

    /// Leaves `Active`, returning the principal the session belonged to.
    fn end(&self, inner: &mut Inner, state: SessionState, reason: LogoutReason) -> Principal {
        self.disarm(inner);
        inner.state = state;
        inner.ended = Some(reason);
        inner.idle_deadline = None;
        std::mem::replace(&mut inner.principal, Principal::Anonymous)
    }

    fn sign_out_and_redirect(&self, reason: Option<LogoutReason>, sign_out: bool) {
        if sign_out {
            if let Err(err) = self.ports.auth.sign_out() {
                warn!(error = %err, "sign-out failed, local session cleared anyway");
            }
        }

        let target = RedirectTarget::login(self.login_path.clone(), reason);
        debug!(target = %target, "redirecting to login");
        self.ports.surface.redirect(&target);
    }

    fn require_active(inner: &Inner) -> Result<(), PortalError> {
        if inner.state.is_active() {
            Ok(())
        } else {
            Err(PortalError::session_expired(
                inner.ended.unwrap_or(LogoutReason::Detached),
            ))
        }
    }

    fn resolve(&self, id: &ProfileId) -> Result<Principal, PortalError> {
        match self.ports.directory.load_profile(id)? {
            Some(record) => Ok(IdentityResolver.resolve(&record)),
            None => {
                warn!(profile = %id, "no profile for signed-in user");
                Ok(Principal::Anonymous)
            }
        }
    }

    /// Applies the stored appearance once. Never fails the caller.
    fn sync_appearance(&self, principal: Principal) {
        let scoped = ScopedStore::new(
            Arc::clone(&self.ports.store),
            Arc::clone(&self.ports.policy),
            principal,
        );

        let rows = match scoped.read(Collection::Settings) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "appearance sync failed, keeping current appearance");
                return;
            }
        };

        let Some(raw) = rows
            .iter()
            .find_map(|row| row.get(THEME_COLUMN).and_then(Value::as_str))
        else {
            debug!("no stored appearance preference");
            return;
        };

        match raw.parse::<Appearance>() {
            Ok(appearance) => {
                debug!(appearance = %appearance, "applying stored appearance");
                self.ports.surface.apply_appearance(appearance);
            }
            Err(err) => warn!(error = %err, "ignoring stored appearance"),
        }
    }
}
