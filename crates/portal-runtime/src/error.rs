//! Runtime errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`PortalError::AuthorizationDenied`] | `AUTH_DENIED` | No |
//! | [`PortalError::SignInRejected`] | `AUTH_SIGN_IN_REJECTED` | No |
//! | [`PortalError::Configuration`] | `CONFIG_INVALID` | No |
//! | [`PortalError::UpstreamUnavailable`] | `UPSTREAM_UNAVAILABLE` | Yes |
//! | [`PortalError::SessionExpired`] | `SESSION_EXPIRED` | Yes |
//!
//! # Propagation
//!
//! A denial or configuration fault is never downgraded to "no data".
//! An upstream outage may be retried, but is never read as a change in
//! permissions. An expired session is recovered by signing in again.

use crate::config::ConfigError;
use crate::session::LogoutReason;
use portal_auth::AccessDenied;
use portal_types::ErrorCode;
use thiserror::Error;

/// Portal runtime error.
///
/// # Example
///
/// ```
/// use portal_runtime::PortalError;
/// use portal_types::ErrorCode;
///
/// let err = PortalError::upstream("data store", "connection reset");
/// assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum PortalError {
    /// The access policy rejected the request.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(#[from] AccessDenied),

    /// The identity service rejected a sign-in attempt.
    #[error("sign-in rejected: {message}")]
    SignInRejected { message: String },

    /// Missing or invalid configuration, including credentials.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The data store or auth collaborator could not be reached.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The session ended; the caller must sign in again.
    #[error("session expired: {reason}")]
    SessionExpired { reason: LogoutReason },
}

impl PortalError {
    /// Creates an UpstreamUnavailable error.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a SignInRejected error.
    pub fn sign_in_rejected(message: impl Into<String>) -> Self {
        Self::SignInRejected {
            message: message.into(),
        }
    }

    /// Creates a SessionExpired error.
    #[must_use]
    pub fn session_expired(reason: LogoutReason) -> Self {
        Self::SessionExpired { reason }
    }

    /// Returns the denial if this is an authorization error.
    #[must_use]
    pub fn as_denied(&self) -> Option<&AccessDenied> {
        match self {
            Self::AuthorizationDenied(denied) => Some(denied),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::AuthorizationDenied(_))
    }
}

impl ErrorCode for PortalError {
    fn code(&self) -> &'static str {
        match self {
            Self::AuthorizationDenied(_) => "AUTH_DENIED",
            Self::SignInRejected { .. } => "AUTH_SIGN_IN_REJECTED",
            Self::Configuration(_) => "CONFIG_INVALID",
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::SessionExpired { .. } => "SESSION_EXPIRED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::SessionExpired { .. }
        )
    }
}
