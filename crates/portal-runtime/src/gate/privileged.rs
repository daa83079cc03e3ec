//! Privileged access gate.
//!
//! ```text
//! Credentials ──require_service_key──► ServiceCredential
//!                                            │
//!                         ServiceConnector::connect
//!                                            ▼
//!                 PrivilegedGate { PrivilegedAccess { unfiltered store } }
//!                                            │
//!                     with_privileged_access(operation, |access| ...)
//! ```
//!
//! [`PrivilegedAccess`] has no public constructor. The only way to hold
//! one is inside the closure passed to
//! [`PrivilegedGate::with_privileged_access`], and the only way to get a
//! gate is [`PrivilegedGate::open`] with a valid service credential.

use super::ServiceCredential;
use crate::config::Credentials;
use crate::store::{DataStore, Record};
use crate::PortalError;
use portal_auth::RowFilter;
use portal_types::Collection;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Opens an unfiltered store handle with the service credential.
pub trait ServiceConnector: Send + Sync {
    /// Connects to the backend as the service role.
    ///
    /// # Errors
    ///
    /// [`PortalError::UpstreamUnavailable`] when the backend cannot be
    /// reached or rejects the key.
    fn connect(&self, credential: &ServiceCredential) -> Result<Arc<dyn DataStore>, PortalError>;
}

/// Unfiltered store access, only reachable inside the gate.
pub struct PrivilegedAccess {
    store: Arc<dyn DataStore>,
}

impl PrivilegedAccess {
    /// Returns every row of `collection`, bypassing per-row policy.
    ///
    /// # Errors
    ///
    /// The store's error.
    pub fn select_all(&self, collection: Collection) -> Result<Vec<Record>, PortalError> {
        self.store.select(collection, &RowFilter::Unrestricted)
    }
}

impl std::fmt::Debug for PrivilegedAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivilegedAccess").finish_non_exhaustive()
    }
}

/// Server-only execution path that skips the access policy.
///
/// # Example
///
/// ```
/// use portal_runtime::config::Credentials;
/// use portal_runtime::gate::PrivilegedGate;
/// use portal_runtime::memory::{MemoryConnector, MemoryStore};
/// use portal_types::ErrorCode;
/// use std::sync::Arc;
///
/// let connector = MemoryConnector::new(Arc::new(MemoryStore::new()));
///
/// // Fails closed without the service key
/// let err = PrivilegedGate::open(&Credentials::default(), &connector).unwrap_err();
/// assert_eq!(err.code(), "CONFIG_INVALID");
/// assert_eq!(connector.connect_calls(), 0);
/// ```
#[derive(Debug)]
pub struct PrivilegedGate {
    credential: ServiceCredential,
    access: PrivilegedAccess,
}

impl PrivilegedGate {
    /// Validates the service key and connects.
    ///
    /// The connector is not touched unless the key is present and valid.
    ///
    /// # Errors
    ///
    /// [`PortalError::Configuration`] when the key is missing or invalid;
    /// the connector's error (with the key redacted) otherwise.
    pub fn open(
        credentials: &Credentials,
        connector: &dyn ServiceConnector,
    ) -> Result<Self, PortalError> {
        let credential = credentials.require_service_key().map_err(|err| {
            warn!(error = %err, "privileged gate refused to open");
            PortalError::from(err)
        })?;

        let store = connector
            .connect(&credential)
            .map_err(|err| redact(&credential, err))?;

        info!("privileged gate opened");
        Ok(Self {
            credential,
            access: PrivilegedAccess { store },
        })
    }

    /// Runs `f` with unfiltered store access.
    ///
    /// `operation` names the call in the audit log.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, with credential material redacted.
    pub fn with_privileged_access<T, F>(&self, operation: &str, f: F) -> Result<T, PortalError>
    where
        F: FnOnce(&PrivilegedAccess) -> Result<T, PortalError>,
    {
        debug!(operation, "privileged operation");
        f(&self.access).map_err(|err| {
            let err = redact(&self.credential, err);
            warn!(operation, error = %err, "privileged operation failed");
            err
        })
    }
}

fn redact(credential: &ServiceCredential, err: PortalError) -> PortalError {
    match err {
        PortalError::UpstreamUnavailable { service, message } => {
            PortalError::upstream(service, credential.redact(&message))
        }
        PortalError::SignInRejected { message } => {
            PortalError::sign_in_rejected(credential.redact(&message))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryConnector, MemoryStore};
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials::from_values(None, Some("svc-key-1".into()))
    }

    #[test]
    fn missing_key_fails_closed() {
        let store = Arc::new(MemoryStore::new());
        let connector = MemoryConnector::new(store.clone());

        let err = PrivilegedGate::open(&Credentials::default(), &connector).unwrap_err();

        assert!(matches!(err, PortalError::Configuration(_)));
        assert_eq!(connector.connect_calls(), 0);
        assert_eq!(store.operation_count(), 0);
    }

    #[test]
    fn select_all_ignores_row_scope() {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            Collection::News,
            [
                json!({ "id": "1", "profile_id": "a" }),
                json!({ "id": "2", "profile_id": "b" }),
            ]
            .into_iter()
            .filter_map(|v| v.as_object().cloned()),
        );
        let gate = PrivilegedGate::open(&credentials(), &MemoryConnector::new(store)).unwrap();

        let rows = gate
            .with_privileged_access("test", |access| access.select_all(Collection::News))
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn upstream_errors_are_redacted() {
        let store = Arc::new(MemoryStore::new());
        store.fail_with("rejected key svc-key-1");
        let gate = PrivilegedGate::open(&credentials(), &MemoryConnector::new(store)).unwrap();

        let err = gate
            .with_privileged_access("test", |access| access.select_all(Collection::Terms))
            .unwrap_err();

        let message = err.to_string();
        assert!(!message.contains("svc-key-1"), "got: {message}");
        assert!(message.contains("[REDACTED]"), "got: {message}");
        assert!(!format!("{gate:?}").contains("svc-key-1"));
    }
}
