//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::CircuitBreakerConfig;
use crate::session::store::DEFAULT_KEY_PREFIX;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Circuit breaker in front of the revocation store.
    pub breaker: BreakerSettings,

    /// Revocation lookup settings.
    pub revocation: RevocationSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Breaker label for logs and metrics.
    pub name: String,

    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Cooldown before a half-open probe, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            name: "redis-token-revocation".to_string(),
            failure_threshold: 5,
            cooldown_ms: 60_000,
        }
    }
}

impl From<&BreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &BreakerSettings) -> Self {
        Self {
            name: settings.name.clone(),
            failure_threshold: settings.failure_threshold,
            cooldown: Duration::from_millis(settings.cooldown_ms),
        }
    }
}

/// Revocation lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RevocationSettings {
    /// Store key prefix; the session id is appended.
    pub key_prefix: String,

    /// Deadline for a single lookup in milliseconds (unset = no deadline).
    pub lookup_timeout_ms: Option<u64>,
}

impl Default for RevocationSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            lookup_timeout_ms: Some(500),
        }
    }
}

impl RevocationSettings {
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
