//! Authorization for the portal runtime.
//!
//! The policy model itself lives in `portal-auth`. This module adds the
//! pieces with side effects:
//!
//! - [`DefaultPolicy`]: [`AccessPolicy`] with audit logging
//! - [`IdentityResolver`]: normalizes directory profiles into [`Principal`]s
//!
//! # Architecture
//!
//! ```text
//! portal-auth (pure engine)
//!     authorize, AccessPolicy, AccessDecision, RowFilter
//!         ↓
//! portal-runtime/auth (runtime implementations)
//!     DefaultPolicy, IdentityResolver, ProfileRecord
//! ```

mod checker;
mod identity;

pub use checker::DefaultPolicy;
pub use identity::{IdentityResolver, ProfileRecord};

// Re-export from portal-auth for convenience
pub use portal_auth::{AccessDecision, AccessDenied, AccessPolicy, RowFilter};

pub use portal_types::Principal;
