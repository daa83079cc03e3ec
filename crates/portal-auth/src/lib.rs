//! Access Policy Engine for the school portal.
//!
//! Decides, for a principal, whether a read or write against a
//! collection is permitted and which rows it may touch.
//!
//! ```text
//! Decision = Authenticated ∩ RoleCapability(WHAT) ∩ Status(WHEN) ∩ RowFilter(WHICH ROWS)
//! ```
//!
//! | Layer | Type | Controls |
//! |-------|------|----------|
//! | [`Capability`] | Bitflags | Which operations a role may attempt per collection |
//! | status downgrade | [`portal_types::TeacherStatus`] | Teachers on leave lose every write |
//! | [`RowFilter`] | Enum | Which rows are visible or writable |
//!
//! # Crate Architecture
//!
//! ```text
//! portal-types  (IDs, Principal, Collection)
//!     ↑
//! portal-auth   ◄── THIS CRATE (pure: no I/O, no logging)
//!     ↑
//! portal-runtime (DefaultPolicy with audit logs, ScopedStore, gate, sessions)
//! ```
//!
//! Deny wins: any failing layer rejects the request, and the rejection
//! is an [`AccessDenied`] error rather than an empty result.

pub mod capability;
pub mod decision;
pub mod error;
pub mod filter;
pub mod policy;

pub use capability::{role_capabilities, Capability};
pub use decision::AccessDecision;
pub use error::AccessDenied;
pub use filter::{RowAttributes, RowContext, RowFilter, CLASS_ID, ID, PROFILE_ID};
pub use policy::{authorize, AccessPolicy, StaticPolicy};

pub use portal_types::Principal;
