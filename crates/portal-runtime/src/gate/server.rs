//! Trusted server context.

use super::{feeds, PrivilegedGate, ServiceConnector};
use crate::config::{Credentials, PortalConfig};
use crate::store::Record;
use crate::PortalError;
use tracing::{info, warn};

/// Server-side context holding the privileged gate.
///
/// Construction is the startup check: a missing or malformed service
/// key stops the server before any request is served.
///
/// # Example
///
/// ```
/// use portal_runtime::config::{Credentials, PortalConfig};
/// use portal_runtime::gate::TrustedServer;
/// use portal_runtime::memory::{MemoryConnector, MemoryStore};
/// use std::sync::Arc;
///
/// let connector = MemoryConnector::new(Arc::new(MemoryStore::new()));
/// let credentials = Credentials::from_values(None, Some("service-key".into()));
///
/// let server = TrustedServer::start(PortalConfig::default(), &credentials, &connector).unwrap();
/// assert!(server.news_feed(5).unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct TrustedServer {
    config: PortalConfig,
    gate: PrivilegedGate,
}

impl TrustedServer {
    /// Opens the gate and returns the running context.
    ///
    /// # Errors
    ///
    /// [`PortalError::Configuration`] when the service key is missing or
    /// invalid; the connector's error otherwise.
    pub fn start(
        config: PortalConfig,
        credentials: &Credentials,
        connector: &dyn ServiceConnector,
    ) -> Result<Self, PortalError> {
        let gate = PrivilegedGate::open(credentials, connector).map_err(|err| {
            warn!(error = %err, "trusted server refused to start");
            err
        })?;

        info!(
            backend = config.backend.url.as_deref().unwrap_or("(unset)"),
            "trusted server started"
        );
        Ok(Self { config, gate })
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    #[must_use]
    pub fn gate(&self) -> &PrivilegedGate {
        &self.gate
    }

    /// See [`feeds::list_terms`].
    ///
    /// # Errors
    ///
    /// [`PortalError::UpstreamUnavailable`] when the store fails.
    pub fn list_terms(&self) -> Result<Vec<Record>, PortalError> {
        feeds::list_terms(&self.gate)
    }

    /// See [`feeds::news_feed`].
    ///
    /// # Errors
    ///
    /// [`PortalError::UpstreamUnavailable`] when the store fails.
    pub fn news_feed(&self, limit: usize) -> Result<Vec<Record>, PortalError> {
        feeds::news_feed(&self.gate, limit)
    }

    /// See [`feeds::spotlight_gallery`].
    ///
    /// # Errors
    ///
    /// [`PortalError::UpstreamUnavailable`] when the store fails.
    pub fn spotlight_gallery(&self, limit: usize) -> Result<Vec<Record>, PortalError> {
        feeds::spotlight_gallery(&self.gate, limit)
    }
}
