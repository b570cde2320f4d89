//! Configuration for the memory synchronizer.
//!
//! # Example
//!
//! ```
//! use memory_sync::SynchronizerConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SynchronizerConfig::default();
//! assert_eq!(config.sync_interval_secs, 300); // 5 minutes
//!
//! // Full config
//! let config = SynchronizerConfig {
//!     sync_interval_secs: 60,
//!     default_pillar: Some("sqlite".into()),
//!     query_timeout_ms: 2_000,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the memory synchronizer.
///
/// All fields have sensible defaults. Timeouts bound each individual pillar
/// invocation inside a fan-out call; a pillar that exceeds its timeout is
/// recorded as a `Timeout` outcome without delaying its siblings.
#[derive(Debug, Clone, Deserialize)]
pub struct SynchronizerConfig {
    /// Background sync interval in seconds (default: 300)
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Fallback pillar for `store` when no capability matches
    #[serde(default)]
    pub default_pillar: Option<String>,

    /// Per-operation timeouts in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
}

fn default_sync_interval_secs() -> u64 { 300 } // 5 minutes
fn default_connect_timeout_ms() -> u64 { 10_000 }
fn default_sync_timeout_ms() -> u64 { 30_000 }
fn default_query_timeout_ms() -> u64 { 5_000 }
fn default_store_timeout_ms() -> u64 { 10_000 }
fn default_flush_timeout_ms() -> u64 { 10_000 }

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: default_sync_interval_secs(),
            default_pillar: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            sync_timeout_ms: default_sync_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            store_timeout_ms: default_store_timeout_ms(),
            flush_timeout_ms: default_flush_timeout_ms(),
        }
    }
}

impl SynchronizerConfig {
    /// Background sync interval as a [`Duration`].
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    #[must_use]
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynchronizerConfig::default();
        assert_eq!(config.sync_interval_secs, 300);
        assert!(config.default_pillar.is_none());
        assert_eq!(config.sync_timeout(), Duration::from_secs(30));
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SynchronizerConfig = serde_json::from_str(
            r#"{"sync_interval_secs": 60, "default_pillar": "sqlite"}"#,
        )
        .unwrap();
        assert_eq!(config.sync_interval_secs, 60);
        assert_eq!(config.default_pillar.as_deref(), Some("sqlite"));
        // Unspecified fields fall back to defaults
        assert_eq!(config.connect_timeout_ms, 10_000);
    }
}
