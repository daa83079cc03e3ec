//! Access policy evaluation.
//!
//! [`authorize`] is the whole policy: a pure function of the principal,
//! the collection, the operation and (for writes) the target row. It
//! touches no store and keeps no state, so concurrent evaluations need
//! no synchronisation.
//!
//! # Resolution Order
//!
//! 1. Anonymous principals are denied everything.
//! 2. The role must hold the operation's [`Capability`] on the collection.
//! 3. A teacher on leave is denied every write, whatever the role allows.
//! 4. The effective [`RowFilter`] is computed. Writes must target a row
//!    inside it; reads get it back to apply to the query.
//!
//! # Visibility
//!
//! | Collection | teacher | student |
//! |------------|---------|---------|
//! | students | `class_id ∈ classes` | `profile_id = id` |
//! | teachers | reads unrestricted, writes `profile_id = id` | unrestricted |
//! | classes | `id ∈ classes` | `id ∈ classes` |
//! | scores | `class_id ∈ classes` | `profile_id = id` |
//! | settings | `profile_id = id` | `profile_id = id` |
//! | terms, subjects, gallery, news | unrestricted | unrestricted |
//!
//! Admins are unrestricted everywhere.

use crate::{
    role_capabilities, AccessDecision, AccessDenied, Capability, RowAttributes, RowFilter,
    CLASS_ID, ID, PROFILE_ID,
};
use portal_types::{ClassSet, Collection, Operation, Principal, ProfileId};

/// Abstract access policy.
///
/// # Implementors
///
/// - [`StaticPolicy`]: the pure role matrix in this crate
/// - `DefaultPolicy` (in `portal-runtime`): [`StaticPolicy`] plus audit logging
///
/// # Example
///
/// ```
/// use portal_auth::{AccessPolicy, RowContext, StaticPolicy};
/// use portal_types::{Collection, Operation, Principal, ProfileId};
///
/// let policy: Box<dyn AccessPolicy> = Box::new(StaticPolicy);
/// let admin = Principal::Admin { id: ProfileId::new() };
///
/// let filter = policy
///     .check(&admin, Collection::Students, Operation::Delete, &RowContext::new())
///     .expect("admins may delete students");
/// assert!(filter.is_unrestricted());
/// ```
pub trait AccessPolicy: Send + Sync {
    /// Evaluates a request.
    ///
    /// `row` describes the target row for writes. It is ignored for reads.
    fn authorize(
        &self,
        principal: &Principal,
        collection: Collection,
        operation: Operation,
        row: &dyn RowAttributes,
    ) -> AccessDecision;

    /// Evaluates a request and converts the decision into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the decision is a denial.
    fn check(
        &self,
        principal: &Principal,
        collection: Collection,
        operation: Operation,
        row: &dyn RowAttributes,
    ) -> Result<RowFilter, AccessDenied> {
        self.authorize(principal, collection, operation, row)
            .into_result()
    }
}

/// The built-in school policy with no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPolicy;

impl AccessPolicy for StaticPolicy {
    fn authorize(
        &self,
        principal: &Principal,
        collection: Collection,
        operation: Operation,
        row: &dyn RowAttributes,
    ) -> AccessDecision {
        authorize(principal, collection, operation, row)
    }
}

/// Evaluates a request against the school policy.
///
/// # Example
///
/// ```
/// use portal_auth::{authorize, RowContext, CLASS_ID};
/// use portal_types::{ClassId, Collection, Operation, Principal, ProfileId, TeacherStatus};
///
/// let own_class = ClassId::new();
/// let teacher = Principal::Teacher {
///     id: ProfileId::new(),
///     status: TeacherStatus::Active,
///     classes: [own_class].into_iter().collect(),
/// };
///
/// let row = RowContext::new().with(CLASS_ID, own_class);
/// assert!(authorize(&teacher, Collection::Scores, Operation::Create, &row).is_allowed());
///
/// let other = RowContext::new().with(CLASS_ID, ClassId::new());
/// assert!(authorize(&teacher, Collection::Scores, Operation::Create, &other).is_denied());
/// ```
pub fn authorize(
    principal: &Principal,
    collection: Collection,
    operation: Operation,
    row: &dyn RowAttributes,
) -> AccessDecision {
    let role = principal.role();

    if !principal.is_authenticated() {
        return AccessDecision::Deny(AccessDenied::Unauthenticated {
            collection,
            operation,
        });
    }

    let required = Capability::for_operation(operation);
    let available = role_capabilities(role, collection);
    if !available.contains(required) {
        return AccessDecision::Deny(AccessDenied::CapabilityDenied {
            role,
            collection,
            operation,
            required,
            available,
        });
    }

    if operation.is_write() && principal.is_on_leave() {
        return AccessDecision::Deny(AccessDenied::OnLeave {
            collection,
            operation,
        });
    }

    let filter = visibility(principal, collection, operation);
    if operation.is_write() && !filter.matches(row) {
        return AccessDecision::Deny(AccessDenied::OutOfScope {
            role,
            collection,
            operation,
            filter,
        });
    }

    AccessDecision::Allow(filter)
}

/// Computes the effective filter for an authenticated principal.
fn visibility(principal: &Principal, collection: Collection, operation: Operation) -> RowFilter {
    match principal {
        Principal::Admin { .. } => RowFilter::Unrestricted,
        Principal::Teacher { id, classes, .. } => match collection {
            Collection::Students | Collection::Scores => in_classes(CLASS_ID, classes),
            Collection::Classes => in_classes(ID, classes),
            Collection::Teachers if operation.is_write() => own(id),
            Collection::Settings => own(id),
            Collection::Teachers
            | Collection::Terms
            | Collection::Subjects
            | Collection::Gallery
            | Collection::News => RowFilter::Unrestricted,
        },
        Principal::Student { id, classes } => match collection {
            Collection::Students | Collection::Scores | Collection::Settings => own(id),
            Collection::Classes => in_classes(ID, classes),
            Collection::Teachers
            | Collection::Terms
            | Collection::Subjects
            | Collection::Gallery
            | Collection::News => RowFilter::Unrestricted,
        },
        // Unreachable after the authentication check; matches nothing.
        Principal::Anonymous => RowFilter::one_of(ID, Vec::<String>::new()),
    }
}

fn own(id: &ProfileId) -> RowFilter {
    RowFilter::equals(PROFILE_ID, id)
}

fn in_classes(column: &str, classes: &ClassSet) -> RowFilter {
    RowFilter::one_of(column, classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RowContext;
    use portal_types::{ClassId, TeacherStatus};

    fn teacher(status: TeacherStatus, classes: &[ClassId]) -> Principal {
        Principal::Teacher {
            id: ProfileId::new(),
            status,
            classes: classes.iter().copied().collect(),
        }
    }

    fn student() -> Principal {
        Principal::Student {
            id: ProfileId::new(),
            classes: ClassSet::new(),
        }
    }

    fn empty() -> RowContext {
        RowContext::new()
    }

    #[test]
    fn anonymous_denied_reads() {
        let d = authorize(&Principal::Anonymous, Collection::News, Operation::Read, &empty());
        assert!(matches!(d, AccessDecision::Deny(AccessDenied::Unauthenticated { .. })));
    }

    #[test]
    fn teacher_cannot_delete_students() {
        let class = ClassId::new();
        let t = teacher(TeacherStatus::Active, &[class]);
        let row = RowContext::new().with(CLASS_ID, class);
        let d = authorize(&t, Collection::Students, Operation::Delete, &row);
        assert!(matches!(d, AccessDecision::Deny(AccessDenied::CapabilityDenied { .. })));
    }

    #[test]
    fn on_leave_checked_after_capability() {
        // Delete on students is a capability denial even when on leave.
        let t = teacher(TeacherStatus::OnLeave, &[]);
        let d = authorize(&t, Collection::Students, Operation::Delete, &empty());
        assert!(matches!(d, AccessDecision::Deny(AccessDenied::CapabilityDenied { .. })));

        let d = authorize(&t, Collection::Scores, Operation::Delete, &empty());
        assert!(matches!(d, AccessDecision::Deny(AccessDenied::OnLeave { .. })));
    }

    #[test]
    fn teacher_reads_scoped_to_assigned_classes() {
        let class = ClassId::new();
        let t = teacher(TeacherStatus::Active, &[class]);
        let filter = authorize(&t, Collection::Scores, Operation::Read, &empty())
            .into_result()
            .expect("teachers read scores");
        assert_eq!(filter, RowFilter::one_of(CLASS_ID, [class]));
    }

    #[test]
    fn teacher_classes_scoped_by_primary_key() {
        let class = ClassId::new();
        let t = teacher(TeacherStatus::Active, &[class]);
        let filter = authorize(&t, Collection::Classes, Operation::Read, &empty())
            .into_result()
            .expect("teachers read classes");
        assert_eq!(filter.column(), Some(ID));
    }

    #[test]
    fn teacher_directory_readable_but_only_own_row_writable() {
        let t = teacher(TeacherStatus::Active, &[]);
        let read = authorize(&t, Collection::Teachers, Operation::Read, &empty());
        assert_eq!(read.filter(), Some(&RowFilter::Unrestricted));

        let other = RowContext::new().with(PROFILE_ID, ProfileId::new());
        let write = authorize(&t, Collection::Teachers, Operation::Update, &other);
        assert!(matches!(write, AccessDecision::Deny(AccessDenied::OutOfScope { .. })));

        let own_row = RowContext::new().with(PROFILE_ID, t.id().copied().unwrap_or_default());
        assert!(authorize(&t, Collection::Teachers, Operation::Update, &own_row).is_allowed());
    }

    #[test]
    fn student_settings_update_own_only() {
        let s = student();
        let own_row = RowContext::new().with(PROFILE_ID, s.id().copied().unwrap_or_default());
        assert!(authorize(&s, Collection::Settings, Operation::Update, &own_row).is_allowed());

        let other = RowContext::new().with(PROFILE_ID, ProfileId::new());
        assert!(authorize(&s, Collection::Settings, Operation::Update, &other).is_denied());
    }

    #[test]
    fn write_missing_scope_column_is_out_of_scope() {
        let t = teacher(TeacherStatus::Active, &[ClassId::new()]);
        let d = authorize(&t, Collection::Scores, Operation::Create, &empty());
        assert!(matches!(d, AccessDecision::Deny(AccessDenied::OutOfScope { .. })));
    }

    #[test]
    fn reads_ignore_row_context() {
        let s = student();
        let unrelated = RowContext::new().with(PROFILE_ID, ProfileId::new());
        assert!(authorize(&s, Collection::Scores, Operation::Read, &unrelated).is_allowed());
    }

    #[test]
    fn admin_unrestricted_everywhere() {
        let admin = Principal::Admin { id: ProfileId::new() };
        for collection in Collection::ALL {
            for op in [Operation::Read, Operation::Create, Operation::Update, Operation::Delete] {
                let d = authorize(&admin, collection, op, &empty());
                assert_eq!(d.filter(), Some(&RowFilter::Unrestricted), "{collection} {op}");
            }
        }
    }

    #[test]
    fn static_policy_delegates() {
        let policy = StaticPolicy;
        let s = student();
        let result = policy.check(&s, Collection::Scores, Operation::Create, &empty());
        assert!(result.is_err());
    }
}
