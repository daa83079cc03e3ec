//! Resource collections and the operations requested against them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned for an unrecognised collection or operation name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseCollectionError {
    kind: &'static str,
    value: String,
}

/// A named set of records in the data store.
///
/// Every collection requires an authenticated principal; there is no
/// public collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Students,
    Teachers,
    Classes,
    Scores,
    Terms,
    Subjects,
    Gallery,
    News,
    Settings,
}

impl Collection {
    /// Every collection, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Students,
        Self::Teachers,
        Self::Classes,
        Self::Scores,
        Self::Terms,
        Self::Subjects,
        Self::Gallery,
        Self::News,
        Self::Settings,
    ];

    /// Returns the table name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Classes => "classes",
            Self::Scores => "scores",
            Self::Terms => "terms",
            Self::Subjects => "subjects",
            Self::Gallery => "gallery",
            Self::News => "news",
            Self::Settings => "settings",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ParseCollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseCollectionError {
                kind: "collection",
                value: s.to_string(),
            })
    }
}

/// Operation requested against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Returns `true` for `Create`, `Update` and `Delete`.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Read)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseCollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "select" => Ok(Self::Read),
            "create" | "insert" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(ParseCollectionError {
                kind: "operation",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for c in Collection::ALL {
            assert_eq!(c.as_str().parse::<Collection>(), Ok(c));
        }
    }

    #[test]
    fn unknown_collection() {
        let err = "grades".parse::<Collection>().unwrap_err();
        assert_eq!(err.to_string(), "unknown collection 'grades'");
    }

    #[test]
    fn only_read_is_not_a_write() {
        assert!(!Operation::Read.is_write());
        assert!(Operation::Create.is_write());
        assert!(Operation::Update.is_write());
        assert!(Operation::Delete.is_write());
    }

    #[test]
    fn operation_sql_aliases() {
        assert_eq!("SELECT".parse::<Operation>(), Ok(Operation::Read));
        assert_eq!("insert".parse::<Operation>(), Ok(Operation::Create));
        assert!("upsert".parse::<Operation>().is_err());
    }
}
