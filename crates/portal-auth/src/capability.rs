//! Role-level capabilities.
//!
//! A [`Capability`] set says *what* operations a role may attempt on a
//! collection, before any row scoping or status downgrade is applied.
//!
//! # Role Matrix
//!
//! | Collection | admin | teacher | student |
//! |------------|-------|---------|---------|
//! | students | ALL | READ, CREATE, UPDATE | READ |
//! | teachers | ALL | READ, UPDATE | READ |
//! | classes | ALL | READ | READ |
//! | scores | ALL | ALL | READ |
//! | terms, subjects, gallery, news | ALL | READ | READ |
//! | settings | ALL | READ, UPDATE | READ, UPDATE |
//!
//! Anonymous principals hold no capability on any collection.
//!
//! # Example
//!
//! ```
//! use portal_auth::{role_capabilities, Capability};
//! use portal_types::{Collection, Role};
//!
//! // Teachers cannot delete students
//! let caps = role_capabilities(Role::Teacher, Collection::Students);
//! assert!(caps.contains(Capability::UPDATE));
//! assert!(!caps.contains(Capability::DELETE));
//!
//! // Students cannot write scores
//! let caps = role_capabilities(Role::Student, Collection::Scores);
//! assert_eq!(caps, Capability::READ);
//! ```

use bitflags::bitflags;
use portal_types::{Collection, Operation, Role};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Operations a role may attempt on a collection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capability: u8 {
        const READ   = 0b0001;
        const CREATE = 0b0010;
        const UPDATE = 0b0100;
        const DELETE = 0b1000;
    }
}

impl Capability {
    /// All mutating capabilities: CREATE | UPDATE | DELETE.
    pub const WRITE: Self = Self::CREATE.union(Self::UPDATE).union(Self::DELETE);

    /// All capabilities.
    pub const ALL: Self = Self::READ.union(Self::WRITE);

    /// Returns the capability an [`Operation`] requires.
    #[must_use]
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Read => Self::READ,
            Operation::Create => Self::CREATE,
            Operation::Update => Self::UPDATE,
            Operation::Delete => Self::DELETE,
        }
    }

    /// Returns a human-readable list of capability names.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::READ) {
            names.push("READ");
        }
        if self.contains(Self::CREATE) {
            names.push("CREATE");
        }
        if self.contains(Self::UPDATE) {
            names.push("UPDATE");
        }
        if self.contains(Self::DELETE) {
            names.push("DELETE");
        }
        names
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

/// Returns the role-level capabilities for `collection`.
///
/// This is step one of policy resolution. It ignores status and row
/// scope entirely; see [`crate::authorize`] for the full evaluation.
#[must_use]
pub fn role_capabilities(role: Role, collection: Collection) -> Capability {
    match role {
        Role::Admin => Capability::ALL,
        Role::Anonymous => Capability::empty(),
        Role::Teacher => match collection {
            Collection::Students => Capability::READ | Capability::CREATE | Capability::UPDATE,
            Collection::Teachers | Collection::Settings => Capability::READ | Capability::UPDATE,
            Collection::Scores => Capability::ALL,
            Collection::Classes
            | Collection::Terms
            | Collection::Subjects
            | Collection::Gallery
            | Collection::News => Capability::READ,
        },
        Role::Student => match collection {
            Collection::Settings => Capability::READ | Capability::UPDATE,
            _ => Capability::READ,
        },
    }
}
