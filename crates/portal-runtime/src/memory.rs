//! In-memory collaborators.
//!
//! Backing implementations of the ports for tests, demos and the CLI.
//! They honour the same contracts as the hosted services (filters are
//! applied, sign-out is counted) but keep everything in process.

use crate::auth::ProfileRecord;
use crate::gate::{ServiceConnector, ServiceCredential};
use crate::session::{
    Appearance, AuthProvider, AuthUser, ClientSurface, ProfileDirectory, RedirectTarget,
};
use crate::store::{DataStore, Record};
use crate::PortalError;
use parking_lot::Mutex;
use portal_auth::{RowAttributes, RowFilter, ID};
use portal_types::{Collection, ParseCollectionError, ProfileId};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

/// Name reported in upstream errors.
const STORE_SERVICE: &str = "data store";

/// [`DataStore`] holding rows in memory.
///
/// # Example
///
/// ```
/// use portal_auth::RowFilter;
/// use portal_runtime::memory::MemoryStore;
/// use portal_runtime::store::DataStore;
/// use portal_types::Collection;
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let row = json!({ "title": "Sports day" }).as_object().cloned().unwrap();
/// let stored = store.insert(Collection::News, row).unwrap();
/// assert!(stored.contains_key("id"));
///
/// let rows = store.select(Collection::News, &RowFilter::Unrestricted).unwrap();
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<Collection, Vec<Record>>>,
    failure: Mutex<Option<String>>,
    operations: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rows without authorization or id assignment.
    pub fn seed(&self, collection: Collection, rows: impl IntoIterator<Item = Record>) {
        self.rows
            .lock()
            .entry(collection)
            .or_default()
            .extend(rows);
    }

    /// Loads a JSON fixture of the form `{ "<collection>": [ {row}, ... ] }`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first malformed entry.
    pub fn from_fixture(fixture: &Value) -> Result<Self, String> {
        let store = Self::new();
        let object = fixture
            .as_object()
            .ok_or_else(|| "fixture must be a JSON object".to_string())?;

        for (name, rows) in object {
            let collection: Collection = name
                .parse()
                .map_err(|e: ParseCollectionError| e.to_string())?;
            let rows = rows
                .as_array()
                .ok_or_else(|| format!("'{name}' must be an array of rows"))?;
            let records = rows
                .iter()
                .map(|row| {
                    row.as_object()
                        .cloned()
                        .ok_or_else(|| format!("'{name}' contains a non-object row"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            store.seed(collection, records);
        }

        Ok(store)
    }

    /// Makes every subsequent call fail with an upstream error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Number of calls made through the [`DataStore`] trait.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Returns every row of `collection`, ignoring filters.
    #[must_use]
    pub fn rows(&self, collection: Collection) -> Vec<Record> {
        self.rows
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn begin(&self) -> Result<(), PortalError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(message) => Err(PortalError::upstream(STORE_SERVICE, message.clone())),
            None => Ok(()),
        }
    }
}

fn matches_id(row: &Record, id: &str) -> bool {
    row.attribute(ID)
        .is_some_and(|value| value.eq_ignore_ascii_case(id))
}

impl DataStore for MemoryStore {
    fn select(
        &self,
        collection: Collection,
        filter: &RowFilter,
    ) -> Result<Vec<Record>, PortalError> {
        self.begin()?;
        Ok(self
            .rows
            .lock()
            .get(&collection)
            .map(|rows| rows.iter().filter(|r| filter.matches(*r)).cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, collection: Collection, mut record: Record) -> Result<Record, PortalError> {
        self.begin()?;
        if record.attribute(ID).is_none() {
            record.insert(ID.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        self.rows
            .lock()
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
        filter: &RowFilter,
    ) -> Result<Option<Record>, PortalError> {
        self.begin()?;
        let mut rows = self.rows.lock();
        let Some(row) = rows.get_mut(&collection).and_then(|rows| {
            rows.iter_mut()
                .find(|r| matches_id(r, id) && filter.matches(&**r))
        }) else {
            return Ok(None);
        };
        row.extend(patch);
        Ok(Some(row.clone()))
    }

    fn delete(
        &self,
        collection: Collection,
        id: &str,
        filter: &RowFilter,
    ) -> Result<bool, PortalError> {
        self.begin()?;
        let mut rows = self.rows.lock();
        let Some(rows) = rows.get_mut(&collection) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !(matches_id(r, id) && filter.matches(r)));
        Ok(rows.len() != before)
    }
}

/// [`AuthProvider`] with registered email/password accounts.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, (SecretString, ProfileId)>>,
    current: Mutex<Option<AuthUser>>,
    sign_outs: AtomicUsize,
    fail_sign_out: AtomicBool,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account. Emails compare case-insensitively.
    pub fn register(&self, email: &str, password: &str, id: ProfileId) {
        self.accounts.lock().insert(
            email.trim().to_ascii_lowercase(),
            (SecretString::from(password.to_string()), id),
        );
    }

    /// Makes `sign_out` fail (the local sign-out still happens).
    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

impl AuthProvider for MemoryAuth {
    fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, PortalError> {
        let key = email.trim().to_ascii_lowercase();
        let accounts = self.accounts.lock();
        let Some((stored, id)) = accounts.get(&key) else {
            return Err(PortalError::sign_in_rejected("invalid email or password"));
        };
        if stored.expose_secret() != password.expose_secret() {
            return Err(PortalError::sign_in_rejected("invalid email or password"));
        }

        let user = AuthUser { id: *id, email: key };
        *self.current.lock() = Some(user.clone());
        Ok(user)
    }

    fn current_user(&self) -> Result<Option<AuthUser>, PortalError> {
        Ok(self.current.lock().clone())
    }

    fn sign_out(&self) -> Result<(), PortalError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.current.lock() = None;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(PortalError::upstream("auth", "sign-out request failed"));
        }
        Ok(())
    }
}

/// [`ProfileDirectory`] backed by a map.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    profiles: Mutex<HashMap<ProfileId, ProfileRecord>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: ProfileRecord) {
        self.profiles.lock().insert(record.id, record);
    }

    /// Overwrites the stored status, as an administrator would.
    pub fn set_status(&self, id: &ProfileId, status: &str) {
        if let Some(record) = self.profiles.lock().get_mut(id) {
            record.status = Some(status.to_string());
        }
    }

    pub fn set_role(&self, id: &ProfileId, role: &str) {
        if let Some(record) = self.profiles.lock().get_mut(id) {
            record.role = role.to_string();
        }
    }

    pub fn remove(&self, id: &ProfileId) {
        self.profiles.lock().remove(id);
    }
}

impl ProfileDirectory for MemoryDirectory {
    fn load_profile(&self, user: &ProfileId) -> Result<Option<ProfileRecord>, PortalError> {
        Ok(self.profiles.lock().get(user).cloned())
    }
}

/// [`ClientSurface`] that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    appearances: Mutex<Vec<Appearance>>,
    redirects: Mutex<Vec<RedirectTarget>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn appearances(&self) -> Vec<Appearance> {
        self.appearances.lock().clone()
    }

    /// Redirects as rendered URLs.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn redirect_targets(&self) -> Vec<RedirectTarget> {
        self.redirects.lock().clone()
    }
}

impl ClientSurface for RecordingSurface {
    fn apply_appearance(&self, appearance: Appearance) {
        self.appearances.lock().push(appearance);
    }

    fn redirect(&self, target: &RedirectTarget) {
        self.redirects.lock().push(target.clone());
    }
}

/// [`ServiceConnector`] that hands out a shared [`MemoryStore`].
///
/// Accepts any well-formed service credential.
#[derive(Debug)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of times [`ServiceConnector::connect`] was called.
    #[must_use]
    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ServiceConnector for MemoryConnector {
    fn connect(&self, _credential: &ServiceCredential) -> Result<Arc<dyn DataStore>, PortalError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let store: Arc<dyn DataStore> = self.store.clone();
        Ok(store)
    }
}
