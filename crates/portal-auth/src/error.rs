//! Authorization denial.
//!
//! [`AccessDenied`] names the resolution step that rejected a request:
//!
//! ```text
//! authenticated? ──► role capability? ──► on leave? ──► row in scope?
//!       │                  │                  │               │
//!  Unauthenticated   CapabilityDenied      OnLeave       OutOfScope
//! ```
//!
//! A denial must reach the caller as a rejected operation. It is never
//! folded into an empty result set.

use crate::{Capability, RowFilter};
use portal_types::{Collection, Operation, Role};
use serde::Serialize;
use thiserror::Error;

/// Reason a policy evaluation returned `allow = false`.
///
/// # Example
///
/// ```
/// use portal_auth::AccessDenied;
/// use portal_types::{Collection, Operation};
///
/// let err = AccessDenied::OnLeave {
///     collection: Collection::Scores,
///     operation: Operation::Update,
/// };
///
/// assert_eq!(err.reason(), "on_leave");
/// assert!(err.to_string().contains("on leave"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AccessDenied {
    /// The principal is not authenticated.
    #[error("authentication required: cannot {operation} {collection}")]
    Unauthenticated {
        collection: Collection,
        operation: Operation,
    },

    /// The role does not hold the capability the operation requires.
    #[error(
        "capability denied: {role} cannot {operation} {collection} \
         (requires {required}, available: {available})"
    )]
    CapabilityDenied {
        role: Role,
        collection: Collection,
        operation: Operation,
        required: Capability,
        available: Capability,
    },

    /// The principal is a teacher on leave; writes are read-only.
    #[error("read-only: teacher on leave cannot {operation} {collection}")]
    OnLeave {
        collection: Collection,
        operation: Operation,
    },

    /// The target row lies outside the principal's visibility.
    #[error("out of scope: {role} cannot {operation} {collection} rows outside {filter}")]
    OutOfScope {
        role: Role,
        collection: Collection,
        operation: Operation,
        filter: RowFilter,
    },
}

impl AccessDenied {
    /// Returns the resolution step that denied access.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::CapabilityDenied { .. } => "capability",
            Self::OnLeave { .. } => "on_leave",
            Self::OutOfScope { .. } => "out_of_scope",
        }
    }

    /// Returns the collection the request targeted.
    #[must_use]
    pub fn collection(&self) -> Collection {
        match self {
            Self::Unauthenticated { collection, .. }
            | Self::CapabilityDenied { collection, .. }
            | Self::OnLeave { collection, .. }
            | Self::OutOfScope { collection, .. } => *collection,
        }
    }

    /// Returns the operation the request attempted.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Unauthenticated { operation, .. }
            | Self::CapabilityDenied { operation, .. }
            | Self::OnLeave { operation, .. }
            | Self::OutOfScope { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_denied_display() {
        let err = AccessDenied::CapabilityDenied {
            role: Role::Student,
            collection: Collection::Scores,
            operation: Operation::Create,
            required: Capability::CREATE,
            available: Capability::READ,
        };

        let msg = err.to_string();
        assert!(msg.contains("student cannot create scores"), "got: {msg}");
        assert!(msg.contains("requires CREATE"), "got: {msg}");
        assert_eq!(err.reason(), "capability");
        assert_eq!(err.collection(), Collection::Scores);
        assert_eq!(err.operation(), Operation::Create);
    }

    #[test]
    fn out_of_scope_names_filter() {
        let err = AccessDenied::OutOfScope {
            role: Role::Teacher,
            collection: Collection::Scores,
            operation: Operation::Create,
            filter: RowFilter::one_of(crate::CLASS_ID, ["c-1"]),
        };

        let msg = err.to_string();
        assert!(msg.contains("class_id in {c-1}"), "got: {msg}");
        assert_eq!(err.reason(), "out_of_scope");
    }

    #[test]
    fn serializes_with_reason_tag() {
        let err = AccessDenied::Unauthenticated {
            collection: Collection::News,
            operation: Operation::Read,
        };
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["reason"], "unauthenticated");
        assert_eq!(json["collection"], "news");
    }
}
