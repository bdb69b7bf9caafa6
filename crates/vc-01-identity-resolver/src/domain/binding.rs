//! Anonymous identity bindings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::DeviceFingerprint;

/// Identity the backend bound to a device fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousBinding {
    pub fingerprint: DeviceFingerprint,
    /// Backend-assigned identity id.
    pub identity_id: String,
    pub bound_at: DateTime<Utc>,
}

impl AnonymousBinding {
    pub fn new(fingerprint: DeviceFingerprint, identity_id: impl Into<String>, bound_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            identity_id: identity_id.into(),
            bound_at,
        }
    }
}
