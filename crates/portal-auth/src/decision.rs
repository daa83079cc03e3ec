//! Policy decision type.

use crate::{AccessDenied, RowFilter};
use serde::Serialize;

/// Result of evaluating a request against the access policy.
///
/// `Allow` carries the effective row filter the data store must apply.
/// `Deny` carries the [`AccessDenied`] reason, which callers surface as
/// a rejected operation.
///
/// # Example
///
/// ```
/// use portal_auth::{AccessDecision, RowFilter};
///
/// let decision = AccessDecision::Allow(RowFilter::Unrestricted);
/// assert!(decision.is_allowed());
/// assert_eq!(decision.status_str(), "allowed");
/// assert_eq!(decision.filter(), Some(&RowFilter::Unrestricted));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum AccessDecision {
    /// The request is permitted within the given row filter.
    Allow(RowFilter),
    /// The request is rejected.
    Deny(AccessDenied),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Returns the effective filter of an allowed decision.
    #[must_use]
    pub fn filter(&self) -> Option<&RowFilter> {
        match self {
            Self::Allow(filter) => Some(filter),
            Self::Deny(_) => None,
        }
    }

    /// Returns the status as a string ("allowed" or "denied").
    #[must_use]
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Allow(_) => "allowed",
            Self::Deny(_) => "denied",
        }
    }

    /// Converts into a `Result` for `?` propagation.
    ///
    /// # Errors
    ///
    /// Returns the [`AccessDenied`] of a denied decision.
    pub fn into_result(self) -> Result<RowFilter, AccessDenied> {
        match self {
            Self::Allow(filter) => Ok(filter),
            Self::Deny(denied) => Err(denied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_types::{Collection, Operation};

    fn denied() -> AccessDecision {
        AccessDecision::Deny(AccessDenied::Unauthenticated {
            collection: Collection::Students,
            operation: Operation::Read,
        })
    }

    #[test]
    fn allowed_helpers() {
        let d = AccessDecision::Allow(RowFilter::Unrestricted);
        assert!(d.is_allowed());
        assert!(!d.is_denied());
        assert_eq!(d.into_result(), Ok(RowFilter::Unrestricted));
    }

    #[test]
    fn denied_helpers() {
        let d = denied();
        assert!(d.is_denied());
        assert!(d.filter().is_none());
        assert_eq!(d.status_str(), "denied");
        assert!(d.into_result().is_err());
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(denied()).expect("serialize");
        assert_eq!(json["decision"], "deny");
        assert_eq!(json["detail"]["reason"], "unauthenticated");
    }
}
