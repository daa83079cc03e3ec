//! Core types for the school portal access layer.
//!
//! This crate holds the identity and vocabulary types shared by every
//! other portal crate. It contains no policy logic and performs no I/O.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  portal-types   : IDs, Role, Principal, Collection  ◄── HERE │
//! │  portal-auth    : Capability, RowFilter, authorize()         │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  portal-runtime : config, identity boundary, ScopedStore,    │
//! │                   PrivilegedGate, SessionManager             │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  portal-cli     : `portal` binary                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use portal_types::{ClassId, Collection, Operation, Principal, ProfileId, Role, TeacherStatus};
//!
//! let teacher = Principal::Teacher {
//!     id: ProfileId::new(),
//!     status: "on leave".parse::<TeacherStatus>().expect("accepted spelling"),
//!     classes: [ClassId::new()].into_iter().collect(),
//! };
//!
//! assert_eq!(teacher.role(), Role::Teacher);
//! assert!(teacher.is_on_leave());
//! assert!(Operation::Create.is_write());
//! assert_eq!(Collection::Scores.as_str(), "scores");
//! ```

mod collection;
mod error;
mod id;
mod principal;

pub use collection::{Collection, Operation, ParseCollectionError};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ClassId, ParseIdError, ProfileId};
pub use principal::{ClassSet, ParseRoleError, ParseStatusError, Principal, Role, TeacherStatus};
