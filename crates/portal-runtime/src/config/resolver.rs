//! Configuration resolver trait for layered overrides.
//!
//! ```text
//! ConfigLoader.load()  →  PortalConfig (base)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()
//!                              │
//!                              ▼
//!                     PortalConfig (final)
//! ```

use super::PortalConfig;

/// Applies overrides (typically CLI flags) on top of a loaded config.
///
/// Only explicitly set values should be applied, preserving existing
/// values for unspecified options.
pub trait ConfigResolver {
    fn apply(&self, config: &mut PortalConfig);
}

/// Resolver that makes no changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut PortalConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_resolver_does_nothing() {
        let mut config = PortalConfig::default();
        let original = config.clone();

        NoOpResolver.apply(&mut config);

        assert_eq!(config, original);
    }

    #[test]
    fn custom_resolver() {
        struct IdleOverride(Option<u64>);

        impl ConfigResolver for IdleOverride {
            fn apply(&self, config: &mut PortalConfig) {
                if let Some(secs) = self.0 {
                    config.session.idle_timeout_secs = secs;
                }
            }
        }

        let mut config = PortalConfig::default();
        IdleOverride(Some(5)).apply(&mut config);
        assert_eq!(config.session.idle_timeout_secs, 5);

        IdleOverride(None).apply(&mut config);
        assert_eq!(config.session.idle_timeout_secs, 5);
    }
}
