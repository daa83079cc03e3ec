//! Privileged Access Gate.
//!
//! The one code path that reads the store without per-row policy. It
//! exists for site-wide aggregations that have no owning principal
//! (term list, news feed, gallery spotlight).
//!
//! # Trust Boundary
//!
//! ```text
//!   client context                 │   trusted context
//!   ───────────────                │   ───────────────
//!   SessionManager                 │   TrustedServer::start
//!     └─ ScopedStore (policy)      │     └─ PrivilegedGate::open
//!                                  │          └─ with_privileged_access
//!   PORTAL_PUBLIC_KEY              │   PORTAL_SERVICE_ROLE_KEY
//! ```
//!
//! The service key never leaves this module in clear text: it is held
//! as a [`ServiceCredential`], redacted from `Debug` output and scrubbed
//! from every error the gate returns.

mod credential;
pub mod feeds;
mod privileged;
mod server;

pub use credential::ServiceCredential;
pub use feeds::{list_terms, news_feed, spotlight_gallery};
pub use privileged::{PrivilegedAccess, PrivilegedGate, ServiceConnector};
pub use server::TrustedServer;
