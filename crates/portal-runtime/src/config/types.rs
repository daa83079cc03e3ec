//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.
//! Secrets are deliberately absent: see [`super::Credentials`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use portal_runtime::config::PortalConfig;
/// use std::time::Duration;
///
/// let config = PortalConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.session.idle_timeout(), Duration::from_secs(30 * 60));
/// assert_eq!(config.session.login_path, "/login");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    /// Enable debug mode (verbose logging).
    pub debug: bool,

    /// Hosted backend location.
    pub backend: BackendConfig,

    /// Session lifecycle settings.
    pub session: SessionConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl PortalConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default. This enables layered configuration.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.backend.merge(&other.backend);
        self.session.merge(&other.session);
        self.logging.merge(&other.logging);
    }
}

/// Hosted backend location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the hosted backend.
    pub url: Option<String>,
}

impl BackendConfig {
    fn merge(&mut self, other: &Self) {
        if other.url.is_some() {
            self.url.clone_from(&other.url);
        }
    }
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity window before a forced logout, in seconds.
    pub idle_timeout_secs: u64,

    /// Minimum spacing between deadline reschedules caused by activity, in ms.
    pub activity_throttle_ms: u64,

    /// Authentication entry point used for redirects after logout.
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            activity_throttle_ms: 1_000,
            login_path: "/login".into(),
        }
    }
}

impl SessionConfig {
    /// Returns the inactivity window.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Returns the activity throttle.
    #[must_use]
    pub fn activity_throttle(&self) -> Duration {
        Duration::from_millis(self.activity_throttle_ms)
    }

    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.idle_timeout_secs != default.idle_timeout_secs {
            self.idle_timeout_secs = other.idle_timeout_secs;
        }
        if other.activity_throttle_ms != default.activity_throttle_ms {
            self.activity_throttle_ms = other.activity_throttle_ms;
        }
        if other.login_path != default.login_path {
            self.login_path.clone_from(&other.login_path);
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when neither `--debug` nor `RUST_LOG` is set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        if other.level != Self::default().level {
            self.level.clone_from(&other.level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_roundtrip() {
        let mut config = PortalConfig::default();
        config.backend.url = Some("https://school.example".into());
        config.session.idle_timeout_secs = 600;

        let toml = config.to_toml().expect("serialize");
        let parsed = PortalConfig::from_toml(&toml).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = PortalConfig::from_toml(
            r#"
[session]
idle_timeout_secs = 120
"#,
        )
        .expect("parse");

        assert_eq!(config.session.idle_timeout_secs, 120);
        assert_eq!(config.session.login_path, "/login");
        assert_eq!(config.session.activity_throttle_ms, 1_000);
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = PortalConfig::default();
        base.session.login_path = "/signin".into();
        base.backend.url = Some("https://a.example".into());

        base.merge(&PortalConfig::default());

        assert_eq!(base.session.login_path, "/signin");
        assert_eq!(base.backend.url.as_deref(), Some("https://a.example"));
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = PortalConfig::default();
        let mut other = PortalConfig::default();
        other.debug = true;
        other.session.idle_timeout_secs = 60;
        other.logging.level = "info".into();

        base.merge(&other);

        assert!(base.debug);
        assert_eq!(base.session.idle_timeout(), Duration::from_secs(60));
        assert_eq!(base.logging.level, "info");
    }
}
