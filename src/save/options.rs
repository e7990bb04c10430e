//! Controller options
//!
//! Serializable configuration for one auto-save controller. Callbacks are
//! not configuration data and live in [`SaveHooks`](super::SaveHooks).

use std::time::Duration;

use crate::core::ConfigError;
use crate::core::constants::{DEFAULT_DELAY_MS, EAGER_DELAY_MS, MAX_DELAY_MS, RELAXED_DELAY_MS};

/// Auto-save configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AutoSaveOptions {
    /// Quiet period after the latest tick before a save fires
    pub delay_ms: u64,
    /// Whether ticks schedule saves at all
    pub enabled: bool,
}

impl Default for AutoSaveOptions {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            enabled: true,
        }
    }
}

impl AutoSaveOptions {
    /// Short quiet period for small, cheap saves
    pub fn eager() -> Self {
        Self {
            delay_ms: EAGER_DELAY_MS,
            ..Self::default()
        }
    }

    /// Long quiet period for large or expensive saves
    pub fn relaxed() -> Self {
        Self {
            delay_ms: RELAXED_DELAY_MS,
            ..Self::default()
        }
    }

    /// Set the quiet period
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the quiet period in milliseconds
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Enable or disable scheduling
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Get the quiet period as Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::DelayTooLong {
                delay_ms: self.delay_ms,
                max_ms: MAX_DELAY_MS,
            });
        }
        Ok(())
    }

    /// Parse and validate options from JSON
    ///
    /// Missing fields take their defaults.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let options = AutoSaveOptions::default();
        assert_eq!(options.delay_ms, DEFAULT_DELAY_MS);
        assert_eq!(options.delay(), Duration::from_millis(2000));
        assert!(options.enabled);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let options = AutoSaveOptions::default()
            .with_delay(Duration::from_millis(150))
            .with_enabled(false);
        assert_eq!(options.delay_ms, 150);
        assert!(!options.enabled);

        assert_eq!(AutoSaveOptions::default().with_delay_ms(0).delay(), Duration::ZERO);
    }

    #[test]
    fn test_presets() {
        let eager = AutoSaveOptions::eager();
        let relaxed = AutoSaveOptions::relaxed();

        assert!(eager.delay() < AutoSaveOptions::default().delay());
        assert!(relaxed.delay() > AutoSaveOptions::default().delay());
        assert!(eager.enabled && relaxed.enabled);
    }

    #[test]
    fn test_validate_rejects_long_delay() {
        let options = AutoSaveOptions::default().with_delay_ms(MAX_DELAY_MS + 1);
        assert_eq!(
            options.validate(),
            Err(ConfigError::DelayTooLong {
                delay_ms: MAX_DELAY_MS + 1,
                max_ms: MAX_DELAY_MS,
            })
        );
        assert!(AutoSaveOptions::default().with_delay_ms(MAX_DELAY_MS).validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let options = AutoSaveOptions::from_json(r#"{ "delay_ms": 750 }"#).unwrap();
        assert_eq!(options.delay_ms, 750);
        assert!(options.enabled);

        let options = AutoSaveOptions::from_json(r#"{ "enabled": false }"#).unwrap();
        assert_eq!(options.delay_ms, DEFAULT_DELAY_MS);
        assert!(!options.enabled);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            AutoSaveOptions::from_json(r#"{ "delay": 5 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AutoSaveOptions::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AutoSaveOptions::from_json(r#"{ "delay_ms": 99999999999 }"#),
            Err(ConfigError::DelayTooLong { .. })
        ));
    }
}
