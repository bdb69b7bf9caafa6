//! Outbound Ports (Driven Ports)
//!
//! Dependencies the identity resolver needs from the platform: persisted
//! session and binding state, device attributes, the identity backend and
//! a clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{DeviceFingerprint, Session};

use crate::domain::{AnonymousBinding, DeviceAttributes};
use crate::error::{AttributeError, BackendError, MergeError, StoreError};

/// Persisted authenticated session (Driven Port)
pub trait SessionStore: Send + Sync {
    /// Load the session, if one was ever saved.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Replace the persisted session.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Persisted fingerprint-to-identity binding (Driven Port)
pub trait BindingStore: Send + Sync {
    fn load(&self) -> Result<Option<AnonymousBinding>, StoreError>;

    fn save(&self, binding: &AnonymousBinding) -> Result<(), StoreError>;
}

/// Consecutive resolution failures, kept across launches (Driven Port)
///
/// A client that fails once per launch still escalates.
pub trait FailureLedger: Send + Sync {
    fn load(&self) -> Result<u32, StoreError>;

    fn save(&self, consecutive_failures: u32) -> Result<(), StoreError>;
}

/// Source of stable device attributes (Driven Port)
pub trait DeviceAttributeSource: Send + Sync {
    fn attributes(&self) -> Result<DeviceAttributes, AttributeError>;
}

/// Remote identity backend (Driven Port)
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Bind a device fingerprint to an anonymous identity.
    ///
    /// Returns the backend identity id. Must be idempotent for the same
    /// fingerprint.
    async fn bind_device(&self, fingerprint: &DeviceFingerprint) -> Result<String, BackendError>;
}

/// Carries anonymous data over to the authenticated account (Driven Port)
#[async_trait]
pub trait MergeCoordinator: Send + Sync {
    async fn merge(&self, from: &DeviceFingerprint, into: &Session) -> Result<(), MergeError>;
}

/// Wall clock (Driven Port)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
