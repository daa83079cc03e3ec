//! Service-role credential.

use crate::config::{ConfigError, SERVICE_KEY_VAR};
use secrecy::{ExposeSecret, SecretString};

/// Placeholder substituted for credential material in messages.
pub(crate) const REDACTED: &str = "[REDACTED]";

/// The private key that unlocks unfiltered store access.
///
/// Only obtainable through
/// [`Credentials::require_service_key`](crate::config::Credentials::require_service_key).
/// Not `Clone`, not `Serialize`; `Debug` prints no key material.
///
/// ```
/// use portal_runtime::config::Credentials;
///
/// let credentials = Credentials::from_values(None, Some("service-key-123".into()));
/// let credential = credentials.require_service_key().unwrap();
/// assert_eq!(format!("{credential:?}"), "ServiceCredential([REDACTED])");
/// ```
pub struct ServiceCredential {
    key: SecretString,
}

impl ServiceCredential {
    pub(crate) fn new(key: SecretString) -> Result<Self, ConfigError> {
        let raw = key.expose_secret();
        if raw.trim().is_empty() {
            return Err(ConfigError::invalid_credential(SERVICE_KEY_VAR, "empty"));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ConfigError::invalid_credential(
                SERVICE_KEY_VAR,
                "contains whitespace or control characters",
            ));
        }
        Ok(Self { key })
    }

    /// Returns the raw key.
    ///
    /// For [`ServiceConnector`](super::ServiceConnector) implementations
    /// only. The value must not be logged, stored or returned to a caller.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.key.expose_secret()
    }

    /// Replaces any occurrence of the key in `text`.
    pub(crate) fn redact(&self, text: &str) -> String {
        text.replace(self.expose(), REDACTED)
    }
}

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ServiceCredential({REDACTED})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_and_embedded_whitespace() {
        assert!(matches!(
            ServiceCredential::new(SecretString::from("   ")),
            Err(ConfigError::InvalidCredential { .. })
        ));
        let err = ServiceCredential::new(SecretString::from("abc def")).unwrap_err();
        assert!(!err.to_string().contains("abc"), "got: {err}");
    }

    #[test]
    fn redact_strips_key() {
        let credential = ServiceCredential::new(SecretString::from("sk-live-42")).unwrap();
        assert_eq!(
            credential.redact("auth failed for key sk-live-42"),
            "auth failed for key [REDACTED]"
        );
        assert_eq!(credential.expose(), "sk-live-42");
    }
}
