//! Policy-enforcing view over a data store.

use super::{DataStore, Record};
use crate::PortalError;
use portal_auth::{AccessPolicy, RowAttributes, RowContext, RowFilter, ID};
use portal_types::{Collection, Operation, Principal};
use std::sync::Arc;

/// A [`DataStore`] bound to one principal and one access policy.
///
/// Every call is authorized before the store is touched. Denials are
/// returned as [`PortalError::AuthorizationDenied`]; a denied read is
/// never reported as an empty result.
///
/// `update` and `delete` first locate the target inside the principal's
/// visibility. A row that cannot be seen cannot be written. Readable is
/// not writable: the current row is authorized for the write before
/// anything else, and `update` also authorizes the patched row, so a
/// write can neither adopt a foreign row nor move a row out of scope.
///
/// # Example
///
/// ```
/// use portal_runtime::auth::DefaultPolicy;
/// use portal_runtime::memory::MemoryStore;
/// use portal_runtime::store::ScopedStore;
/// use portal_types::{Collection, Principal};
/// use std::sync::Arc;
///
/// let scoped = ScopedStore::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(DefaultPolicy),
///     Principal::Anonymous,
/// );
///
/// let err = scoped.read(Collection::News).unwrap_err();
/// assert!(err.is_denied());
/// ```
#[derive(Clone)]
pub struct ScopedStore {
    store: Arc<dyn DataStore>,
    policy: Arc<dyn AccessPolicy>,
    principal: Principal,
}

impl std::fmt::Debug for ScopedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStore")
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

impl ScopedStore {
    pub fn new(
        store: Arc<dyn DataStore>,
        policy: Arc<dyn AccessPolicy>,
        principal: Principal,
    ) -> Self {
        Self {
            store,
            policy,
            principal,
        }
    }

    /// Returns the principal snapshot this view acts as.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns every row of `collection` visible to the principal.
    ///
    /// # Errors
    ///
    /// [`PortalError::AuthorizationDenied`] if reads are not permitted,
    /// or the store's error.
    pub fn read(&self, collection: Collection) -> Result<Vec<Record>, PortalError> {
        let filter = self.authorize(collection, Operation::Read, &RowContext::new())?;
        self.store.select(collection, &filter)
    }

    /// Returns the visible row with primary key `id`, if any.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn find(&self, collection: Collection, id: &str) -> Result<Option<Record>, PortalError> {
        Ok(self
            .read(collection)?
            .into_iter()
            .find(|row| has_id(row, id)))
    }

    /// Inserts `record` if the principal may create it.
    ///
    /// # Errors
    ///
    /// [`PortalError::AuthorizationDenied`] if the role cannot create in
    /// `collection` or the record lies outside the principal's scope.
    pub fn create(&self, collection: Collection, record: Record) -> Result<Record, PortalError> {
        self.authorize(collection, Operation::Create, &record)?;
        self.store.insert(collection, record)
    }

    /// Applies `patch` to the row with primary key `id`.
    ///
    /// Returns `None` only for unrestricted principals when the row does
    /// not exist; everyone else gets a denial for rows they cannot see.
    ///
    /// # Errors
    ///
    /// [`PortalError::AuthorizationDenied`] if the current or the
    /// patched row is outside the principal's scope.
    pub fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, PortalError> {
        let Some(current) = self.locate(collection, Operation::Update, id)? else {
            return Ok(None);
        };

        self.authorize(collection, Operation::Update, &current)?;

        let mut patched = current;
        patched.extend(patch.clone());
        let filter = self.authorize(collection, Operation::Update, &patched)?;

        self.store.update(collection, id, patch, &filter)
    }

    /// Deletes the row with primary key `id`.
    ///
    /// Returns `false` only for unrestricted principals when the row does
    /// not exist.
    ///
    /// # Errors
    ///
    /// [`PortalError::AuthorizationDenied`] if the row is outside the
    /// principal's scope or the role cannot delete.
    pub fn delete(&self, collection: Collection, id: &str) -> Result<bool, PortalError> {
        let Some(current) = self.locate(collection, Operation::Delete, id)? else {
            return Ok(false);
        };

        let filter = self.authorize(collection, Operation::Delete, &current)?;
        self.store.delete(collection, id, &filter)
    }

    fn authorize(
        &self,
        collection: Collection,
        operation: Operation,
        row: &dyn RowAttributes,
    ) -> Result<RowFilter, PortalError> {
        Ok(self
            .policy
            .check(&self.principal, collection, operation, row)?)
    }

    /// Finds the write target inside the principal's read visibility.
    fn locate(
        &self,
        collection: Collection,
        operation: Operation,
        id: &str,
    ) -> Result<Option<Record>, PortalError> {
        if let Some(row) = self.find(collection, id)? {
            return Ok(Some(row));
        }

        // Not visible: evaluate against the bare key so capability and
        // leave denials keep their reason. Scoped principals land on
        // OutOfScope here; unrestricted ones learn the row is missing.
        self.authorize(collection, operation, &RowContext::new().with(ID, id))?;
        Ok(None)
    }
}

fn has_id(row: &Record, id: &str) -> bool {
    row.attribute(ID)
        .is_some_and(|value| value.eq_ignore_ascii_case(id))
}
