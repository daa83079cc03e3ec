//! Row visibility filters.
//!
//! A [`RowFilter`] is the effective filter of a policy decision: the
//! predicate a data store must apply so a principal only sees (or
//! writes) the rows its role is scoped to.
//!
//! Rows are anything implementing [`RowAttributes`]. [`RowContext`] is
//! the small attribute map callers build for a single row; JSON records
//! (`serde_json::Map`) implement the trait directly.

use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Column holding the owning profile id.
pub const PROFILE_ID: &str = "profile_id";
/// Column holding the class a row belongs to.
pub const CLASS_ID: &str = "class_id";
/// Primary key column.
pub const ID: &str = "id";

/// Read access to the attributes of a single row.
pub trait RowAttributes {
    /// Returns the textual value of `column`, or `None` if absent or null.
    fn attribute(&self, column: &str) -> Option<Cow<'_, str>>;
}

/// Attribute map describing a row for a write decision.
///
/// # Example
///
/// ```
/// use portal_auth::{RowAttributes, RowContext, CLASS_ID};
///
/// let row = RowContext::new().with(CLASS_ID, "c-1");
/// assert_eq!(row.attribute(CLASS_ID).as_deref(), Some("c-1"));
/// assert!(row.attribute("profile_id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowContext {
    attributes: BTreeMap<String, String>,
}

impl RowContext {
    /// Creates an empty row context (used for reads).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(column.into(), value.to_string());
        self
    }

    /// Returns `true` if no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl RowAttributes for RowContext {
    fn attribute(&self, column: &str) -> Option<Cow<'_, str>> {
        self.attributes.get(column).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl RowAttributes for Map<String, Value> {
    fn attribute(&self, column: &str) -> Option<Cow<'_, str>> {
        match self.get(column)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Effective row filter of an allowed decision.
///
/// Values compare case-insensitively since every scoped column holds
/// a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFilter {
    /// Every row is visible.
    Unrestricted,
    /// Only rows whose `column` equals `value`.
    Equals { column: String, value: String },
    /// Only rows whose `column` is one of `values`. An empty set matches nothing.
    OneOf {
        column: String,
        values: BTreeSet<String>,
    },
}

impl RowFilter {
    /// Builds an [`RowFilter::Equals`] filter.
    #[must_use]
    pub fn equals(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.to_string().to_ascii_lowercase(),
        }
    }

    /// Builds an [`RowFilter::OneOf`] filter.
    #[must_use]
    pub fn one_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::OneOf {
            column: column.into(),
            values: values
                .into_iter()
                .map(|v| v.to_string().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Returns the constrained column, or `None` when unrestricted.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Unrestricted => None,
            Self::Equals { column, .. } | Self::OneOf { column, .. } => Some(column),
        }
    }

    /// Returns `true` for [`RowFilter::Unrestricted`].
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns `true` if `row` is visible under this filter.
    ///
    /// A row missing the constrained column never matches.
    ///
    /// # Example
    ///
    /// ```
    /// use portal_auth::{RowContext, RowFilter, PROFILE_ID};
    ///
    /// let own = RowFilter::equals(PROFILE_ID, "abc");
    /// assert!(own.matches(&RowContext::new().with(PROFILE_ID, "ABC")));
    /// assert!(!own.matches(&RowContext::new().with(PROFILE_ID, "xyz")));
    /// assert!(!own.matches(&RowContext::new()));
    /// ```
    pub fn matches<R: RowAttributes + ?Sized>(&self, row: &R) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Equals { column, value } => row
                .attribute(column)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(value)),
            Self::OneOf { column, values } => row
                .attribute(column)
                .is_some_and(|actual| values.contains(&actual.to_ascii_lowercase())),
        }
    }
}

impl std::fmt::Display for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "unrestricted"),
            Self::Equals { column, value } => write!(f, "{column} = {value}"),
            Self::OneOf { column, values } => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "{column} in {{{}}}", joined.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn unrestricted_matches_empty_row() {
        assert!(RowFilter::Unrestricted.matches(&RowContext::new()));
    }

    #[test]
    fn one_of_empty_matches_nothing() {
        let filter = RowFilter::one_of(CLASS_ID, Vec::<String>::new());
        assert!(!filter.matches(&RowContext::new().with(CLASS_ID, "c-1")));
    }

    #[test]
    fn one_of_matches_member() {
        let filter = RowFilter::one_of(CLASS_ID, ["c-1", "c-2"]);
        assert!(filter.matches(&RowContext::new().with(CLASS_ID, "C-2")));
        assert!(!filter.matches(&RowContext::new().with(CLASS_ID, "c-3")));
    }

    #[test]
    fn json_record_attributes() {
        let row = record(json!({
            "id": 7,
            "profile_id": "p-1",
            "spotlight": true,
            "class_id": null,
        }));
        assert_eq!(row.attribute(ID).as_deref(), Some("7"));
        assert_eq!(row.attribute(PROFILE_ID).as_deref(), Some("p-1"));
        assert_eq!(row.attribute("spotlight").as_deref(), Some("true"));
        assert!(row.attribute(CLASS_ID).is_none());
        assert!(row.attribute("missing").is_none());
    }

    #[test]
    fn filter_on_json_record() {
        let row = record(json!({ "profile_id": "p-1" }));
        assert!(RowFilter::equals(PROFILE_ID, "p-1").matches(&row));
        assert!(!RowFilter::equals(PROFILE_ID, "p-2").matches(&row));
    }

    #[test]
    fn column_accessor() {
        assert_eq!(RowFilter::Unrestricted.column(), None);
        assert_eq!(RowFilter::equals(PROFILE_ID, "x").column(), Some(PROFILE_ID));
    }

    #[test]
    fn display_formatting() {
        assert_eq!(RowFilter::Unrestricted.to_string(), "unrestricted");
        assert_eq!(RowFilter::equals(PROFILE_ID, "p").to_string(), "profile_id = p");
        assert_eq!(
            RowFilter::one_of(CLASS_ID, ["b", "a"]).to_string(),
            "class_id in {a, b}"
        );
    }
}
