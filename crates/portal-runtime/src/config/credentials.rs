//! Backend credentials.
//!
//! Two keys exist:
//!
//! | Variable | Used by | Exposure |
//! |----------|---------|----------|
//! | `PORTAL_PUBLIC_KEY` | client contexts (identity, reads under policy) | may reach clients |
//! | `PORTAL_SERVICE_ROLE_KEY` | [`PrivilegedGate`](crate::gate::PrivilegedGate) only | never leaves the trusted server |
//!
//! Both are read from the process environment once at startup and are
//! never part of the TOML config. The service key is held as a
//! [`SecretString`], so `Debug` output is redacted.

use super::ConfigError;
use crate::gate::ServiceCredential;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the public (client) key.
pub const PUBLIC_KEY_VAR: &str = "PORTAL_PUBLIC_KEY";

/// Environment variable holding the private service-role key.
pub const SERVICE_KEY_VAR: &str = "PORTAL_SERVICE_ROLE_KEY";

/// Credentials loaded from the protected configuration source.
#[derive(Debug, Default)]
pub struct Credentials {
    public_key: Option<String>,
    service_key: Option<SecretString>,
}

impl Credentials {
    /// Reads both keys from the environment. Empty values count as absent.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(PUBLIC_KEY_VAR).ok(),
            std::env::var(SERVICE_KEY_VAR).ok(),
        )
    }

    /// Builds credentials from explicit values.
    ///
    /// Surrounding whitespace is trimmed; empty values count as absent.
    #[must_use]
    pub fn from_values(public_key: Option<String>, service_key: Option<String>) -> Self {
        let present = |key: String| {
            let key = key.trim();
            (!key.is_empty()).then(|| key.to_string())
        };
        Self {
            public_key: public_key.and_then(present),
            service_key: service_key.and_then(present).map(SecretString::from),
        }
    }

    #[must_use]
    pub fn has_public_key(&self) -> bool {
        self.public_key.is_some()
    }

    #[must_use]
    pub fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    /// Returns the public key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when unset.
    pub fn require_public_key(&self) -> Result<&str, ConfigError> {
        self.public_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing_credential(PUBLIC_KEY_VAR))
    }

    /// Returns the validated service credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when unset, or
    /// [`ConfigError::InvalidCredential`] when malformed.
    pub fn require_service_key(&self) -> Result<ServiceCredential, ConfigError> {
        let secret = self
            .service_key
            .as_ref()
            .ok_or_else(|| ConfigError::missing_credential(SERVICE_KEY_VAR))?;
        ServiceCredential::new(SecretString::from(secret.expose_secret().to_owned()))
    }
}
