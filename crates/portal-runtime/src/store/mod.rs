//! Data store port.
//!
//! The hosted backend is reached through [`DataStore`], a constrained
//! query interface that always takes the effective [`RowFilter`] of a
//! policy decision. This crate never implements storage itself; the
//! in-memory [`MemoryStore`](crate::memory::MemoryStore) exists for
//! tests and the CLI.
//!
//! ```text
//! caller ──► ScopedStore ──authorize──► AccessPolicy
//!                │
//!                └──(filter)──► DataStore ──► backend
//!
//! trusted server ──► PrivilegedAccess ──(unrestricted)──► DataStore
//! ```

mod scoped;

pub use scoped::ScopedStore;

use crate::PortalError;
use portal_auth::RowFilter;
use portal_types::Collection;
use serde_json::{Map, Value};

/// A single row: column name to JSON value.
pub type Record = Map<String, Value>;

/// Constrained query interface of the hosted backend.
///
/// Every call carries the filter the caller is entitled to. An
/// implementation must never return or touch rows outside it.
///
/// # Errors
///
/// Transport failures are reported as
/// [`PortalError::UpstreamUnavailable`].
pub trait DataStore: Send + Sync {
    /// Returns every row of `collection` matching `filter`.
    fn select(&self, collection: Collection, filter: &RowFilter)
        -> Result<Vec<Record>, PortalError>;

    /// Inserts a row and returns it as stored (with its `id`).
    fn insert(&self, collection: Collection, record: Record) -> Result<Record, PortalError>;

    /// Merges `patch` into the row with primary key `id`, if it matches `filter`.
    ///
    /// Returns the updated row, or `None` when no visible row has that key.
    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
        filter: &RowFilter,
    ) -> Result<Option<Record>, PortalError>;

    /// Deletes the row with primary key `id`, if it matches `filter`.
    ///
    /// Returns `true` when a row was removed.
    fn delete(&self, collection: Collection, id: &str, filter: &RowFilter)
        -> Result<bool, PortalError>;
}
