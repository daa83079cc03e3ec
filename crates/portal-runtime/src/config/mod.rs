//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. Environment Variables (PORTAL_*)      │  Runtime override
//! ├───────────────────────────────────────────┤
//! │  2. Project Config (.portal/config.toml)  │  Deployment-specific
//! ├───────────────────────────────────────────┤
//! │  3. Global Config (~/.portal/config.toml) │  Operator defaults
//! ├───────────────────────────────────────────┤
//! │  4. Default Values (compile-time)         │  Fallback
//! └───────────────────────────────────────────┘
//! ```
//!
//! Credentials are a separate source: [`Credentials`] reads them from the
//! environment only, so they can never be written back with `to_toml`.
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `PORTAL_DEBUG` | `debug` | bool |
//! | `PORTAL_URL` | `backend.url` | String |
//! | `PORTAL_IDLE_TIMEOUT_SECS` | `session.idle_timeout_secs` | u64 |
//! | `PORTAL_LOGIN_PATH` | `session.login_path` | String |
//! | `PORTAL_LOG_LEVEL` | `logging.level` | String |
//! | `PORTAL_PUBLIC_KEY` | [`Credentials`] | secret |
//! | `PORTAL_SERVICE_ROLE_KEY` | [`Credentials`] | secret, server only |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.portal/config.toml
//! debug = false
//!
//! [backend]
//! url = "https://school.example"
//!
//! [session]
//! idle_timeout_secs = 1800
//! activity_throttle_ms = 1000
//! login_path = "/login"
//!
//! [logging]
//! level = "warn"
//! ```

mod credentials;
mod error;
mod loader;
mod resolver;
mod types;

pub use credentials::{Credentials, PUBLIC_KEY_VAR, SERVICE_KEY_VAR};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{BackendConfig, LoggingConfig, PortalConfig, SessionConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".portal")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".portal";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
