//! # Client Configuration
//!
//! Unified configuration for the init steps and the deferred identity task.
//!
//! ## Security Requirements
//!
//! - At least one certificate pin MUST be configured; each pin is the hex
//!   SHA-256 of a server public key
//! - Insecure transport is only accepted in debug builds
//!
//! Pins are checked by the CRITICAL `security-config` step, not here, so a
//! bad pin shows up as an aborted bootstrap rather than a config parse error.

use serde::{Deserialize, Serialize};
use shared_bus::DeliveryMode;
use shared_types::ConfigurationError;
use std::path::PathBuf;
use std::time::Duration;
use vc_01_identity_resolver::{ExpiredSessionPolicy, IdentityConfig};

/// Complete client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Identity resolution configuration.
    pub identity: IdentityConfig,
    /// Alert routing configuration.
    pub alerts: AlertConfig,
    /// Background job configuration.
    pub scheduler: SchedulerConfig,
    /// Response cache configuration.
    pub cache: CacheConfig,
    /// Security configuration.
    pub security: SecurityConfig,
}

impl ClientConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from `lookup`.
    ///
    /// # Environment Variables
    ///
    /// - `VIGIL_DATA_DIR`: data directory (default: ./vigil-data)
    /// - `VIGIL_ALERT_MODE`: `sync` or `async` delivery (default: sync)
    /// - `VIGIL_SYNC_INTERVAL_SECS`: recurring sync period (default: 900)
    /// - `VIGIL_MONITOR_INTERVAL_SECS`: integrity re-check period (default: 300)
    /// - `VIGIL_CACHE_CAPACITY`: response cache entries (default: 256)
    /// - `VIGIL_PINNING_KEYS`: comma-separated hex SHA-256 pins
    /// - `VIGIL_EXPIRED_SESSION_POLICY`: `fallback` or `reauth` (default: fallback)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("VIGIL_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(mode) = lookup("VIGIL_ALERT_MODE") {
            config.alerts.delivery = mode
                .parse()
                .map_err(|reason: String| ConfigurationError::invalid("VIGIL_ALERT_MODE", reason))?;
        }
        if let Some(secs) = lookup("VIGIL_SYNC_INTERVAL_SECS") {
            config.scheduler.sync_interval_secs = parse_number("VIGIL_SYNC_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("VIGIL_MONITOR_INTERVAL_SECS") {
            config.scheduler.monitor_interval_secs =
                parse_number("VIGIL_MONITOR_INTERVAL_SECS", &secs)?;
        }
        if let Some(capacity) = lookup("VIGIL_CACHE_CAPACITY") {
            config.cache.capacity = parse_number("VIGIL_CACHE_CAPACITY", &capacity)?;
        }
        if let Some(pins) = lookup("VIGIL_PINNING_KEYS") {
            config.security.pinning_keys = pins
                .split(',')
                .map(str::trim)
                .filter(|pin| !pin.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(policy) = lookup("VIGIL_EXPIRED_SESSION_POLICY") {
            config.identity.expired_session_policy = policy.parse::<ExpiredSessionPolicy>().map_err(
                |reason| ConfigurationError::invalid("VIGIL_EXPIRED_SESSION_POLICY", reason),
            )?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Structural validation.
    ///
    /// Security-relevant checks live in the `security-config` step.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.scheduler.sync_interval_secs == 0 {
            return Err(ConfigurationError::invalid(
                "scheduler.sync_interval_secs",
                "must be at least 1",
            ));
        }
        if self.scheduler.monitor_interval_secs == 0 {
            return Err(ConfigurationError::invalid(
                "scheduler.monitor_interval_secs",
                "must be at least 1",
            ));
        }
        if self.identity.escalate_after_failures == 0 {
            return Err(ConfigurationError::invalid(
                "identity.escalate_after_failures",
                "must be at least 1",
            ));
        }
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigurationError::invalid("storage.data_dir", "must not be empty"));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigurationError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigurationError::invalid(field, e.to_string()))
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for session, binding and install-id files.
    pub data_dir: PathBuf,
    /// Free space the data directory must have, in bytes.
    pub min_free_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./vigil-data"),
            min_free_bytes: 4 * 1024 * 1024,
        }
    }
}

impl StorageConfig {
    /// Exported address book read by the contact normalizer.
    pub fn contacts_file(&self) -> PathBuf {
        self.data_dir.join("contacts.json")
    }
}

/// Alert routing configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    pub delivery: DeliveryMode,
}

/// Background job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period of the recurring sync job, in seconds.
    pub sync_interval_secs: u64,
    /// Period of the security monitor re-check, in seconds.
    pub monitor_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: 900,
            monitor_interval_secs: 300,
        }
    }
}

impl SchedulerConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached responses. Zero disables the cache step.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Hex SHA-256 pins of trusted server public keys.
    /// MUST be set in production.
    pub pinning_keys: Vec<String>,
    /// Accept plaintext transport (debug builds only).
    pub allow_insecure_transport: bool,
}
