//! Audited access policy.
//!
//! [`DefaultPolicy`] is the policy the runtime installs: it delegates
//! every decision to the pure [`portal_auth::authorize`] and records an
//! audit event for it.
//!
//! # Example
//!
//! ```
//! use portal_auth::{AccessPolicy, RowContext};
//! use portal_runtime::auth::DefaultPolicy;
//! use portal_types::{Collection, Operation, Principal, ProfileId};
//!
//! let policy = DefaultPolicy;
//! let student = Principal::Student {
//!     id: ProfileId::new(),
//!     classes: Default::default(),
//! };
//!
//! // Students cannot write scores
//! let row = RowContext::new();
//! let decision = policy.authorize(&student, Collection::Scores, Operation::Create, &row);
//! assert!(decision.is_denied());
//! ```

use portal_auth::{AccessDecision, AccessPolicy, RowAttributes};
use portal_types::{Collection, Operation, Principal};

/// Default access policy with audit logging.
///
/// # Audit Logging
///
/// - Allowed requests: debug level, with the effective filter
/// - Denied requests: warn level, with the denial reason
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl AccessPolicy for DefaultPolicy {
    fn authorize(
        &self,
        principal: &Principal,
        collection: Collection,
        operation: Operation,
        row: &dyn RowAttributes,
    ) -> AccessDecision {
        let decision = portal_auth::authorize(principal, collection, operation, row);

        match &decision {
            AccessDecision::Allow(filter) => {
                tracing::debug!(
                    principal = %principal,
                    collection = %collection,
                    operation = %operation,
                    filter = %filter,
                    "access allowed"
                );
            }
            AccessDecision::Deny(denied) => {
                tracing::warn!(
                    principal = %principal,
                    collection = %collection,
                    operation = %operation,
                    reason = denied.reason(),
                    "access denied: {denied}"
                );
            }
        }

        decision
    }
}
