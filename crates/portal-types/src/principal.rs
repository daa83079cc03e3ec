//! Principal (acting identity) types.
//!
//! A [`Principal`] is the authenticated actor a request is evaluated for.
//! It is a tagged union over [`Role`] so that role-specific data (a
//! teacher's leave status, a student's enrolled classes) can only exist
//! on the role that owns it.
//!
//! Status strings coming from the profile store are normalized into
//! [`TeacherStatus`] once, at the identity boundary. Nothing downstream
//! compares status text.

use crate::{ClassId, ProfileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// Set of classes a principal is assigned to or enrolled in.
pub type ClassSet = BTreeSet<ClassId>;

/// Error returned for an unrecognised role string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

/// Error returned for an unrecognised teacher status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown teacher status '{0}'")]
pub struct ParseStatusError(pub String);

/// Coarse role of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Anonymous,
}

impl Role {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Anonymous => "anonymous",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            "anonymous" | "anon" => Ok(Self::Anonymous),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Employment status of a teacher.
///
/// `OnLeave` keeps read access and removes every write capability.
///
/// # Accepted spellings
///
/// Profile rows carry this as free text and both `on_leave` and
/// `on leave` are present in stored data. Parsing accepts either (and
/// `on-leave`), case-insensitively. [`as_str`](Self::as_str) always
/// returns the canonical `on_leave`, which is what gets written back.
///
/// ```
/// use portal_types::TeacherStatus;
///
/// for raw in ["on_leave", "on leave", "On Leave", " ON-LEAVE "] {
///     let status: TeacherStatus = raw.parse().expect("accepted spelling");
///     assert_eq!(status, TeacherStatus::OnLeave);
///     assert_eq!(status.as_str(), "on_leave");
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherStatus {
    #[default]
    Active,
    OnLeave,
}

impl TeacherStatus {
    /// Returns the canonical stored spelling.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnLeave => "on_leave",
        }
    }
}

impl std::fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeacherStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "on_leave" => Ok(Self::OnLeave),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// The actor a request is evaluated for.
///
/// # Variants
///
/// | Variant | Carries | Row scope |
/// |---------|---------|-----------|
/// | `Admin` | id | unrestricted |
/// | `Teacher` | id, status, assigned classes | assigned classes |
/// | `Student` | id, enrolled classes | own rows |
/// | `Anonymous` | nothing | nothing |
///
/// The role of a principal is fixed for the lifetime of a session.
/// A teacher's status may change between sessions and is re-read from
/// the profile store on every session refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Admin {
        id: ProfileId,
    },
    Teacher {
        id: ProfileId,
        status: TeacherStatus,
        classes: ClassSet,
    },
    Student {
        id: ProfileId,
        classes: ClassSet,
    },
    Anonymous,
}

impl Principal {
    /// Returns the [`Role`] of this principal.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Teacher { .. } => Role::Teacher,
            Self::Student { .. } => Role::Student,
            Self::Anonymous => Role::Anonymous,
        }
    }

    /// Returns the profile id, or `None` for [`Principal::Anonymous`].
    #[must_use]
    pub fn id(&self) -> Option<&ProfileId> {
        match self {
            Self::Admin { id } | Self::Teacher { id, .. } | Self::Student { id, .. } => Some(id),
            Self::Anonymous => None,
        }
    }

    /// Returns the assigned (teacher) or enrolled (student) classes.
    ///
    /// Admins and anonymous principals have no class set.
    #[must_use]
    pub fn classes(&self) -> Option<&ClassSet> {
        match self {
            Self::Teacher { classes, .. } | Self::Student { classes, .. } => Some(classes),
            Self::Admin { .. } | Self::Anonymous => None,
        }
    }

    /// Returns `true` for a teacher whose status is [`TeacherStatus::OnLeave`].
    #[must_use]
    pub fn is_on_leave(&self) -> bool {
        matches!(
            self,
            Self::Teacher {
                status: TeacherStatus::OnLeave,
                ..
            }
        )
    }

    /// Returns `true` unless this is [`Principal::Anonymous`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}:{}", self.role(), id),
            None => write!(f, "{}", self.role()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(status: TeacherStatus) -> Principal {
        Principal::Teacher {
            id: ProfileId::new(),
            status,
            classes: ClassSet::new(),
        }
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" TEACHER ".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn status_accepts_both_leave_spellings() {
        assert_eq!("on_leave".parse::<TeacherStatus>(), Ok(TeacherStatus::OnLeave));
        assert_eq!("on leave".parse::<TeacherStatus>(), Ok(TeacherStatus::OnLeave));
        assert_eq!("Active".parse::<TeacherStatus>(), Ok(TeacherStatus::Active));
    }

    #[test]
    fn status_rejects_unknown() {
        let err = "sabbatical".parse::<TeacherStatus>().unwrap_err();
        assert!(err.to_string().contains("sabbatical"));
    }

    #[test]
    fn status_normalizes_on_write() {
        let parsed: TeacherStatus = "on leave".parse().expect("accepted");
        assert_eq!(parsed.to_string(), "on_leave");
    }

    #[test]
    fn principal_accessors() {
        let id = ProfileId::new();
        let admin = Principal::Admin { id };
        assert_eq!(admin.role(), Role::Admin);
        assert_eq!(admin.id(), Some(&id));
        assert!(admin.classes().is_none());
        assert!(admin.is_authenticated());

        assert!(Principal::Anonymous.id().is_none());
        assert!(!Principal::Anonymous.is_authenticated());
    }

    #[test]
    fn on_leave_only_for_teachers() {
        assert!(teacher(TeacherStatus::OnLeave).is_on_leave());
        assert!(!teacher(TeacherStatus::Active).is_on_leave());
        assert!(!Principal::Admin { id: ProfileId::new() }.is_on_leave());
    }

    #[test]
    fn display_includes_role_and_id() {
        let id = ProfileId::new();
        let student = Principal::Student {
            id,
            classes: ClassSet::new(),
        };
        assert_eq!(student.to_string(), format!("student:{id}"));
        assert_eq!(Principal::Anonymous.to_string(), "anonymous");
    }

    #[test]
    fn serde_tagged_by_role() {
        let p = teacher(TeacherStatus::OnLeave);
        let json = serde_json::to_value(&p).expect("serialize");
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["status"], "on_leave");
    }
}
