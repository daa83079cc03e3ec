//! Portal Runtime - side-effecting layer of the portal access core.
//!
//! Everything that touches configuration, credentials, clocks, timers
//! or collaborators lives here. The policy itself is pure and lives in
//! `portal-auth`.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Policy Layer                             │
//! │  (Pure, no I/O)                                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  portal-types : Principal, Role, Collection, ErrorCode      │
//! │  portal-auth  : authorize, RowFilter, AccessDenied          │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  auth/    : DefaultPolicy, IdentityResolver                 │
//! │  store/   : DataStore port, ScopedStore                     │
//! │  gate/    : PrivilegedGate, TrustedServer, feeds            │
//! │  session/ : SessionManager, Clock, Scheduler                │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! │  (portal-cli)                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`auth`] - Policy & Identity
//!
//! - [`DefaultPolicy`](auth::DefaultPolicy): the school policy with audit logging
//! - [`IdentityResolver`](auth::IdentityResolver): profile record to [`Principal`]
//!
//! ## [`store`] - Data Access
//!
//! - [`DataStore`](store::DataStore): backend port
//! - [`ScopedStore`](store::ScopedStore): every call authorized first
//!
//! ## [`gate`] - Privileged Access
//!
//! - [`PrivilegedGate`](gate::PrivilegedGate): unfiltered reads, service key only
//! - [`TrustedServer`](gate::TrustedServer): refuses to start without the key
//!
//! ## [`session`] - Session Lifecycle
//!
//! - [`SessionManager`](session::SessionManager): sign-in, idle timeout, logout
//! - [`TokioScheduler`](session::TokioScheduler): timers on the tokio runtime
//!
//! ## [`config`] - Configuration Management
//!
//! - [`PortalConfig`](config::PortalConfig): unified configuration type
//! - [`ConfigLoader`](config::ConfigLoader): multi-source config loader
//! - [`Credentials`](config::Credentials): keys from the environment only
//!
//! Configuration priority: Environment > Project > Global > Default
//!
//! ## [`memory`] and [`testing`]
//!
//! In-process collaborators and a manual clock for tests and demos.

pub mod auth;
pub mod config;
mod error;
pub mod gate;
pub mod memory;
pub mod session;
pub mod store;
pub mod testing;

pub use error::PortalError;

// Re-exports for convenience
pub use auth::{DefaultPolicy, IdentityResolver, ProfileRecord};
pub use config::{
    default_config_dir, default_config_path, ConfigError, ConfigLoader, ConfigResolver,
    Credentials, NoOpResolver, PortalConfig,
};
pub use gate::{PrivilegedGate, ServiceConnector, TrustedServer};
pub use session::{SessionManager, SessionPorts, SessionState};
pub use store::{DataStore, Record, ScopedStore};

// Re-export Principal from portal_types (it's part of the public API)
pub use portal_types::Principal;
