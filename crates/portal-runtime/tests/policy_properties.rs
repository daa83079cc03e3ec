//! Policy properties checked across every collection and operation.

use portal_auth::{authorize, AccessDenied, RowContext, RowFilter, CLASS_ID, ID, PROFILE_ID};
use portal_types::{ClassId, ClassSet, Collection, Operation, Principal, ProfileId, TeacherStatus};

const WRITES: [Operation; 3] = [Operation::Create, Operation::Update, Operation::Delete];

fn teacher(id: ProfileId, status: TeacherStatus, classes: &ClassSet) -> Principal {
    Principal::Teacher {
        id,
        status,
        classes: classes.clone(),
    }
}

fn student(classes: &[ClassId]) -> Principal {
    Principal::Student {
        id: ProfileId::new(),
        classes: classes.iter().copied().collect(),
    }
}

/// Rows a caller might present, in or out of the principal's scope.
fn row_variants(principal: &Principal, classes: &[ClassId]) -> Vec<RowContext> {
    let own = principal.id().copied().unwrap_or_default();
    let mut rows = vec![
        RowContext::new(),
        RowContext::new().with(PROFILE_ID, own),
        RowContext::new().with(PROFILE_ID, ProfileId::new()),
        RowContext::new().with(CLASS_ID, ClassId::new()),
        RowContext::new().with(ID, ClassId::new()),
    ];
    for class in classes {
        rows.push(RowContext::new().with(CLASS_ID, class).with(PROFILE_ID, own));
        rows.push(RowContext::new().with(ID, class));
    }
    rows
}

// =============================================================================
// On-leave teachers
// =============================================================================

#[test]
fn on_leave_teacher_denied_every_write_with_reads_unchanged() {
    let id = ProfileId::new();
    let classes: Vec<ClassId> = vec![ClassId::new(), ClassId::new()];
    let class_set: ClassSet = classes.iter().copied().collect();
    let active = teacher(id, TeacherStatus::Active, &class_set);
    let on_leave = teacher(id, TeacherStatus::OnLeave, &class_set);

    for collection in Collection::ALL {
        for row in row_variants(&on_leave, &classes) {
            for op in WRITES {
                let decision = authorize(&on_leave, collection, op, &row);
                assert!(decision.is_denied(), "{collection} {op} allowed while on leave");
            }

            assert_eq!(
                authorize(&on_leave, collection, Operation::Read, &row),
                authorize(&active, collection, Operation::Read, &row),
                "read of {collection} changed by leave status"
            );
        }
    }
}

#[test]
fn on_leave_denial_reason_when_role_could_write() {
    let class = ClassId::new();
    let on_leave = teacher(
        ProfileId::new(),
        TeacherStatus::OnLeave,
        &[class].into_iter().collect(),
    );
    let row = RowContext::new().with(CLASS_ID, class);

    let denied = authorize(&on_leave, Collection::Scores, Operation::Create, &row)
        .into_result()
        .unwrap_err();
    assert!(matches!(denied, AccessDenied::OnLeave { .. }));
}

// =============================================================================
// Student visibility
// =============================================================================

#[test]
fn student_reads_of_students_always_constrained_to_own_profile() {
    let class_sets = [vec![], vec![ClassId::new()], vec![ClassId::new(), ClassId::new()]];

    for classes in &class_sets {
        let s = student(classes);
        let own = s.id().copied().unwrap_or_default();

        for row in row_variants(&s, classes) {
            let filter = authorize(&s, Collection::Students, Operation::Read, &row)
                .into_result()
                .expect("students read their own record");
            assert_eq!(filter, RowFilter::equals(PROFILE_ID, own));
            assert!(!filter.is_unrestricted());

            for op in WRITES {
                assert!(authorize(&s, Collection::Students, op, &row).is_denied());
            }
        }
    }
}

// =============================================================================
// Scores matrix
// =============================================================================

#[test]
fn scores_create_matrix() {
    let assigned = ClassId::new();
    let unassigned = ClassId::new();
    let active = teacher(
        ProfileId::new(),
        TeacherStatus::Active,
        &[assigned].into_iter().collect(),
    );
    let s = student(&[assigned]);

    let in_class = RowContext::new().with(CLASS_ID, assigned);
    let other_class = RowContext::new().with(CLASS_ID, unassigned);

    assert!(authorize(&s, Collection::Scores, Operation::Create, &in_class).is_denied());
    assert!(authorize(&active, Collection::Scores, Operation::Create, &in_class).is_allowed());
    assert!(authorize(&active, Collection::Scores, Operation::Create, &other_class).is_denied());
}

#[test]
fn anonymous_denied_everything() {
    for collection in Collection::ALL {
        for op in [Operation::Read, Operation::Create, Operation::Update, Operation::Delete] {
            let decision = authorize(&Principal::Anonymous, collection, op, &RowContext::new());
            assert!(matches!(
                decision.into_result(),
                Err(AccessDenied::Unauthenticated { .. })
            ));
        }
    }
}
