//! Identity resolver configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do when the persisted session has expired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiredSessionPolicy {
    /// Continue with the device-fingerprint identity; the stale session is kept
    /// so that re-authentication can refresh it.
    #[default]
    FallBackToDevice,
    /// Resolve to `Unresolved` until the user logs in again.
    RequireReauthentication,
}

impl FromStr for ExpiredSessionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fallback" | "fall-back-to-device" => Ok(Self::FallBackToDevice),
            "reauth" | "require-reauthentication" => Ok(Self::RequireReauthentication),
            other => Err(format!("unknown expired session policy: {other}")),
        }
    }
}

/// Identity resolver configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub expired_session_policy: ExpiredSessionPolicy,
    /// Consecutive resolution failures at which the alert escalates from
    /// LOW to HIGH.
    pub escalate_after_failures: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            expired_session_policy: ExpiredSessionPolicy::default(),
            escalate_after_failures: 2,
        }
    }
}
