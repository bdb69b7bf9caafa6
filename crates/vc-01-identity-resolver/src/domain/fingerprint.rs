//! Device fingerprint derivation
//!
//! The fingerprint is a SHA-256 digest over a canonical encoding of the
//! device attributes:
//!
//! ```text
//! "vigil-device-fp-v1" || for each field: len(u32 LE) || trimmed lowercase bytes
//! ```
//!
//! Length prefixes keep `("ab", "c")` and `("a", "bc")` distinct. Fields are
//! encoded in a fixed order so the digest never depends on how the caller
//! built the struct.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::DeviceFingerprint;

use crate::error::AttributeError;

/// Domain separation tag for fingerprint digests.
pub const FINGERPRINT_DOMAIN: &[u8] = b"vigil-device-fp-v1";

/// Stable device attributes the fingerprint is derived from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    /// Per-install identifier, survives app updates.
    pub install_id: String,
    /// Hardware-bound identifier, if the platform exposes one.
    pub hardware_id: String,
    pub manufacturer: String,
    pub model: String,
    pub os_family: String,
}

impl DeviceAttributes {
    fn canonical_fields(&self) -> [&str; 5] {
        [
            &self.install_id,
            &self.hardware_id,
            &self.manufacturer,
            &self.model,
            &self.os_family,
        ]
    }

    /// Whether at least one identifying (not merely descriptive) field is set.
    pub fn has_stable_attribute(&self) -> bool {
        !self.install_id.trim().is_empty() || !self.hardware_id.trim().is_empty()
    }
}

/// Derive the device fingerprint.
///
/// Fails if neither the install id nor the hardware id is present, since a
/// fingerprint over descriptive fields alone would collide across devices.
pub fn derive_fingerprint(attributes: &DeviceAttributes) -> Result<DeviceFingerprint, AttributeError> {
    if !attributes.has_stable_attribute() {
        return Err(AttributeError::NoStableAttribute);
    }

    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN);
    for field in attributes.canonical_fields() {
        let normalized = field.trim().to_lowercase();
        hasher.update((normalized.len() as u32).to_le_bytes());
        hasher.update(normalized.as_bytes());
    }

    Ok(DeviceFingerprint::new(hex::encode(hasher.finalize())))
}
