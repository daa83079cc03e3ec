//! Identity boundary.
//!
//! Profiles arrive from the directory with free-text `role` and
//! `status` columns. [`IdentityResolver`] normalizes them into a
//! [`Principal`] exactly once, so nothing past this point compares
//! status strings.
//!
//! # Normalization
//!
//! | Input | Result |
//! |-------|--------|
//! | role `admin` / `teacher` / `student` (any case) | matching variant |
//! | any other role | [`Principal::Anonymous`] |
//! | teacher status missing | [`TeacherStatus::Active`] |
//! | `on_leave`, `on leave`, `On-Leave` | [`TeacherStatus::OnLeave`] |
//! | unrecognised teacher status | [`TeacherStatus::OnLeave`] (warned) |
//!
//! An unrecognised status degrades to read-only so that malformed data
//! can never widen write access.

use portal_types::{ClassId, ClassSet, Principal, ProfileId, Role, TeacherStatus};
use serde::{Deserialize, Serialize};

/// Profile row as returned by the profile directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: ProfileId,
    pub role: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Assigned (teacher) or enrolled (student) classes.
    #[serde(default)]
    pub class_ids: Vec<ClassId>,
}

impl ProfileRecord {
    /// Creates a record with no status and no classes.
    pub fn new(id: ProfileId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            status: None,
            class_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = ClassId>) -> Self {
        self.class_ids = classes.into_iter().collect();
        self
    }

    /// Returns the record with its status rewritten to the canonical
    /// spelling, for writing back to the directory.
    ///
    /// ```
    /// use portal_runtime::auth::ProfileRecord;
    /// use portal_types::ProfileId;
    ///
    /// let record = ProfileRecord::new(ProfileId::new(), "teacher").with_status("On Leave");
    /// assert_eq!(record.normalized().status.as_deref(), Some("on_leave"));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(status) = self.status.take() {
            let canonical = resolve_status(self.id, Some(status.as_str()));
            self.status = Some(canonical.as_str().to_string());
        }
        self
    }
}

/// Resolves directory profiles into principals.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IdentityResolver {
    /// Resolves a profile into a principal.
    ///
    /// # Example
    ///
    /// ```
    /// use portal_runtime::auth::{IdentityResolver, ProfileRecord};
    /// use portal_types::{ProfileId, TeacherStatus};
    ///
    /// let record = ProfileRecord::new(ProfileId::new(), "Teacher").with_status("on leave");
    /// let principal = IdentityResolver.resolve(&record);
    /// assert!(principal.is_on_leave());
    /// ```
    #[must_use]
    pub fn resolve(&self, record: &ProfileRecord) -> Principal {
        let classes: ClassSet = record.class_ids.iter().copied().collect();
        let id = record.id;

        match record.role.parse::<Role>() {
            Ok(Role::Admin) => Principal::Admin { id },
            Ok(Role::Teacher) => Principal::Teacher {
                id,
                status: resolve_status(id, record.status.as_deref()),
                classes,
            },
            Ok(Role::Student) => Principal::Student { id, classes },
            Ok(Role::Anonymous) => Principal::Anonymous,
            Err(_) => {
                tracing::warn!(
                    profile = %id,
                    role = %record.role,
                    "unknown role, resolving as anonymous"
                );
                Principal::Anonymous
            }
        }
    }
}

fn resolve_status(id: ProfileId, status: Option<&str>) -> TeacherStatus {
    let Some(raw) = status.filter(|s| !s.trim().is_empty()) else {
        return TeacherStatus::Active;
    };

    match raw.parse::<TeacherStatus>() {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(
                profile = %id,
                status = %raw,
                "unknown teacher status, degrading to read-only"
            );
            TeacherStatus::OnLeave
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(status: Option<&str>) -> Principal {
        let mut record = ProfileRecord::new(ProfileId::new(), "teacher");
        record.status = status.map(str::to_string);
        IdentityResolver.resolve(&record)
    }

    #[test]
    fn missing_status_is_active() {
        assert!(!teacher(None).is_on_leave());
        assert!(!teacher(Some("  ")).is_on_leave());
    }

    #[test]
    fn both_leave_spellings_accepted() {
        for spelling in ["on_leave", "on leave", "ON LEAVE", "on-leave"] {
            assert!(teacher(Some(spelling)).is_on_leave(), "{spelling}");
        }
        assert!(!teacher(Some("Active")).is_on_leave());
    }

    #[test]
    fn unknown_status_degrades_to_read_only() {
        assert!(teacher(Some("sabbatical")).is_on_leave());
    }

    #[test]
    fn unknown_role_is_anonymous() {
        let record = ProfileRecord::new(ProfileId::new(), "parent");
        assert_eq!(IdentityResolver.resolve(&record), Principal::Anonymous);
    }

    #[test]
    fn student_classes_carried() {
        let class = ClassId::new();
        let record = ProfileRecord::new(ProfileId::new(), "student").with_classes([class]);
        let principal = IdentityResolver.resolve(&record);
        assert_eq!(principal.role(), Role::Student);
        assert!(principal.classes().is_some_and(|c| c.contains(&class)));
    }

    #[test]
    fn normalized_rewrites_status_only_when_present() {
        let record = ProfileRecord::new(ProfileId::new(), "teacher");
        assert_eq!(record.clone().normalized(), record);

        let record = record.with_status("on leave").normalized();
        assert_eq!(record.status.as_deref(), Some("on_leave"));
    }

    #[test]
    fn deserializes_sparse_rows() {
        let id = ProfileId::new();
        let json = format!(r#"{{"id":"{id}","role":"admin"}}"#);
        let record: ProfileRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record.status, None);
        assert!(record.class_ids.is_empty());
        assert_eq!(IdentityResolver.resolve(&record), Principal::Admin { id });
    }
}
