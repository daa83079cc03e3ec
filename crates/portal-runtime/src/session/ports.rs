//! Collaborators of the session manager.
//!
//! - [`AuthProvider`]: the hosted identity service
//! - [`ProfileDirectory`]: role, status and class assignments per user
//! - [`ClientSurface`]: the client context (appearance, navigation)

use crate::auth::ProfileRecord;
use crate::PortalError;
use portal_types::ProfileId;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Authenticated user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: ProfileId,
    pub email: String,
}

/// Hosted identity service.
pub trait AuthProvider: Send + Sync {
    /// Verifies an email/password pair.
    ///
    /// # Errors
    ///
    /// [`PortalError::SignInRejected`] for bad credentials,
    /// [`PortalError::UpstreamUnavailable`] when unreachable.
    fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, PortalError>;

    /// Returns the currently signed-in user, if any.
    fn current_user(&self) -> Result<Option<AuthUser>, PortalError>;

    /// Ends the current identity session.
    fn sign_out(&self) -> Result<(), PortalError>;
}

/// Source of truth for role, status and class assignment.
pub trait ProfileDirectory: Send + Sync {
    fn load_profile(&self, user: &ProfileId) -> Result<Option<ProfileRecord>, PortalError>;
}

/// The client context a session runs in.
pub trait ClientSurface: Send + Sync {
    fn apply_appearance(&self, appearance: Appearance);

    fn redirect(&self, target: &RedirectTarget);
}

/// Persisted appearance preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    Light,
    Dark,
    #[default]
    System,
}

impl Appearance {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`Appearance`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown appearance '{0}'")]
pub struct ParseAppearanceError(pub String);

impl FromStr for Appearance {
    type Err = ParseAppearanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            _ => Err(ParseAppearanceError(s.to_string())),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// No activity for the full idle window.
    Inactivity,
    /// The user logged out.
    UserRequested,
    /// Another client context signed out.
    SignedOutElsewhere,
    /// The profile's role changed or disappeared on refresh.
    ProfileChanged,
    /// The session context was detached without signing out.
    Detached,
}

impl LogoutReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactivity => "inactivity",
            Self::UserRequested => "user_requested",
            Self::SignedOutElsewhere => "signed_out_elsewhere",
            Self::ProfileChanged => "profile_changed",
            Self::Detached => "detached",
        }
    }
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the client is sent after a session ends.
///
/// # Example
///
/// ```
/// use portal_runtime::session::{LogoutReason, RedirectTarget};
///
/// let target = RedirectTarget::login("/login", Some(LogoutReason::Inactivity));
/// assert_eq!(target.to_string(), "/login?reason=inactivity");
///
/// let target = RedirectTarget::login("/login", None);
/// assert_eq!(target.to_string(), "/login");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub path: String,
    pub reason: Option<LogoutReason>,
}

impl RedirectTarget {
    pub fn login(path: impl Into<String>, reason: Option<LogoutReason>) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

impl std::fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            None => f.write_str(&self.path),
            Some(reason) => {
                let sep = if self.path.contains('?') { '&' } else { '?' };
                write!(f, "{}{sep}reason={reason}", self.path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appearance_parse() {
        assert_eq!("Dark".parse::<Appearance>(), Ok(Appearance::Dark));
        assert_eq!(" light ".parse::<Appearance>(), Ok(Appearance::Light));
        assert_eq!("auto".parse::<Appearance>(), Ok(Appearance::System));
        assert!("sepia".parse::<Appearance>().is_err());
        assert_eq!(Appearance::default(), Appearance::System);
    }

    #[test]
    fn redirect_appends_to_existing_query() {
        let target = RedirectTarget::login("/login?next=%2F", Some(LogoutReason::Inactivity));
        assert_eq!(target.to_string(), "/login?next=%2F&reason=inactivity");
    }
}
