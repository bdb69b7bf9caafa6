//! # `security-config` (CRITICAL)
//!
//! Refuses to start on an insecure configuration:
//!
//! - no certificate pins, or a pin that is not a hex SHA-256 digest
//! - plaintext transport enabled outside a debug build
//! - data directory that cannot be created or is nearly full

use async_trait::async_trait;
use shared_types::{InitAction, SubsystemFailure};
use std::collections::HashSet;
use tracing::info;

use crate::container::config::{SecurityConfig, StorageConfig};

/// Step name in the registry.
pub const STEP_NAME: &str = "security-config";

/// Decode a certificate pin.
pub fn parse_pin(pin: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(pin.trim()).map_err(|e| format!("pin is not hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| format!("pin must be 32 bytes, got {}", bytes.len()))
}

pub struct SecurityConfigStep {
    security: SecurityConfig,
    storage: StorageConfig,
    debug_build: bool,
}

impl SecurityConfigStep {
    pub fn new(security: SecurityConfig, storage: StorageConfig) -> Self {
        Self {
            security,
            storage,
            debug_build: cfg!(debug_assertions),
        }
    }

    /// Override build flavor detection.
    pub fn with_debug_build(mut self, debug_build: bool) -> Self {
        self.debug_build = debug_build;
        self
    }

    fn check_pins(&self) -> Result<usize, SubsystemFailure> {
        if self.security.pinning_keys.is_empty() {
            return Err(SubsystemFailure::misconfigured(
                "no certificate pins configured (set VIGIL_PINNING_KEYS)",
            ));
        }

        let mut seen = HashSet::new();
        for (index, pin) in self.security.pinning_keys.iter().enumerate() {
            let digest = parse_pin(pin)
                .map_err(|reason| SubsystemFailure::misconfigured(format!("pin #{index}: {reason}")))?;
            if !seen.insert(digest) {
                return Err(SubsystemFailure::misconfigured(format!("pin #{index} is a duplicate")));
            }
        }
        Ok(seen.len())
    }

    fn check_transport(&self) -> Result<(), SubsystemFailure> {
        if self.security.allow_insecure_transport && !self.debug_build {
            return Err(SubsystemFailure::misconfigured(
                "insecure transport is only allowed in debug builds",
            ));
        }
        Ok(())
    }

    fn check_data_dir(&self) -> Result<u64, SubsystemFailure> {
        let dir = &self.storage.data_dir;
        std::fs::create_dir_all(dir).map_err(|e| {
            SubsystemFailure::initialization(format!("cannot create {}: {e}", dir.display()))
        })?;

        let available = fs2::available_space(dir).map_err(|e| {
            SubsystemFailure::unavailable(format!("cannot stat {}: {e}", dir.display()))
        })?;
        if available < self.storage.min_free_bytes {
            return Err(SubsystemFailure::unavailable(format!(
                "{} has {} bytes free, need {}",
                dir.display(),
                available,
                self.storage.min_free_bytes
            )));
        }
        Ok(available)
    }
}

#[async_trait]
impl InitAction for SecurityConfigStep {
    async fn run(&self) -> Result<(), SubsystemFailure> {
        let pins = self.check_pins()?;
        self.check_transport()?;
        let available = self.check_data_dir()?;

        info!(
            pins,
            data_dir = %self.storage.data_dir.display(),
            available_bytes = available,
            "[SecurityConfig] Configuration accepted"
        );
        Ok(())
    }
}
