//! Session store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokenward_token::{DEFAULT_TOKEN_BYTES, MIN_TOKEN_BYTES};
use tracing::warn;

/// Upper bound on any session lifetime (ten years).
///
/// Keeps `created_at + ttl` far away from the edge of what `SystemTime`
/// can represent, whatever TTL a caller passes in.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Configuration for the session store.
///
/// `#[serde(default)]` means a config file only has to mention the fields
/// it wants to change. `{"default_ttl_secs": 60}` is a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long (in seconds) a new session stays valid.
    ///
    /// Default: 300 seconds (five minutes).
    pub default_ttl_secs: u64,

    /// Random bytes fed into each token before encoding.
    ///
    /// Default: 16 (128 bits). Values below 16 are raised to 16.
    pub token_byte_length: usize,

    /// How often (in seconds) a background task sweeps expired sessions.
    ///
    /// Default: `None`, no background task. Expiry is enforced on every
    /// read regardless; this only bounds how long dead records occupy
    /// memory.
    pub sweep_interval_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300,
            token_byte_length: DEFAULT_TOKEN_BYTES,
            sweep_interval_secs: None,
        }
    }
}

impl SessionConfig {
    /// A default config with a different session lifetime.
    pub fn with_ttl(default_ttl_secs: u64) -> Self {
        Self {
            default_ttl_secs,
            ..Default::default()
        }
    }

    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SessionStore::new`](crate::SessionStore::new).
    /// Rules:
    /// - `token_byte_length` raised to at least [`MIN_TOKEN_BYTES`].
    /// - `default_ttl_secs` capped at [`MAX_TTL`].
    /// - `sweep_interval_secs` of `Some(0)` means "disabled".
    pub fn validated(mut self) -> Self {
        if self.token_byte_length < MIN_TOKEN_BYTES {
            warn!(
                requested = self.token_byte_length,
                min = MIN_TOKEN_BYTES,
                "token_byte_length below minimum; raising"
            );
            self.token_byte_length = MIN_TOKEN_BYTES;
        }
        if self.default_ttl_secs > MAX_TTL.as_secs() {
            warn!(
                requested = self.default_ttl_secs,
                max = MAX_TTL.as_secs(),
                "default_ttl_secs exceeds maximum; clamping"
            );
            self.default_ttl_secs = MAX_TTL.as_secs();
        }
        if self.sweep_interval_secs == Some(0) {
            warn!("sweep_interval_secs is 0; background sweeping disabled");
            self.sweep_interval_secs = None;
        }
        self
    }

    /// The default session lifetime as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// The background sweep period, if one is configured.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.default_ttl_secs, 300);
        assert_eq!(config.token_byte_length, 16);
        assert_eq!(config.sweep_interval_secs, None);
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), None);
    }

    #[test]
    fn test_validated_raises_short_token_length() {
        let config = SessionConfig {
            token_byte_length: 8,
            ..Default::default()
        }
        .validated();

        assert_eq!(config.token_byte_length, MIN_TOKEN_BYTES);
    }

    #[test]
    fn test_validated_clamps_huge_ttl() {
        let config = SessionConfig::with_ttl(u64::MAX).validated();

        assert_eq!(config.default_ttl(), MAX_TTL);
    }

    #[test]
    fn test_validated_zero_sweep_interval_disables_sweeper() {
        let config = SessionConfig {
            sweep_interval_secs: Some(0),
            ..Default::default()
        }
        .validated();

        assert_eq!(config.sweep_interval_secs, None);
    }

    #[test]
    fn test_validated_keeps_sane_values() {
        let config = SessionConfig {
            default_ttl_secs: 60,
            token_byte_length: 32,
            sweep_interval_secs: Some(5),
        };

        assert_eq!(config.clone().validated(), config);
    }

    #[test]
    fn test_deserialize_partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"default_ttl_secs": 60}"#).unwrap();

        assert_eq!(config.default_ttl_secs, 60);
        assert_eq!(config.token_byte_length, 16);
        assert_eq!(config.sweep_interval_secs, None);
    }

    #[test]
    fn test_deserialize_sweep_interval() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"sweep_interval_secs": 30}"#).unwrap();

        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(30)));
    }
}
