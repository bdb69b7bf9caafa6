//! Identity backend and merge adapters

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{DeviceFingerprint, Session};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::error::{BackendError, MergeError};
use crate::ports::{IdentityBackend, MergeCoordinator};

/// Backend that derives the identity id from the fingerprint locally.
///
/// Used when the client runs without a reachable identity service; the id
/// is stable per fingerprint.
#[derive(Debug, Default)]
pub struct LocalIdentityBackend;

#[async_trait]
impl IdentityBackend for LocalIdentityBackend {
    async fn bind_device(&self, fingerprint: &DeviceFingerprint) -> Result<String, BackendError> {
        Ok(format!("anon-{}", fingerprint.short()))
    }
}

/// Backend with a switchable outcome that counts bind requests.
#[derive(Default)]
pub struct ScriptedBackend {
    failure: Mutex<Option<BackendError>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every following bind with `error`.
    pub fn fail_with(&self, error: BackendError) {
        *self.failure.lock() = Some(error);
    }

    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    /// Number of bind requests received so far.
    pub fn bind_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityBackend for ScriptedBackend {
    async fn bind_device(&self, fingerprint: &DeviceFingerprint) -> Result<String, BackendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failure = self.failure.lock().clone();
        match failure {
            Some(e) => Err(e),
            None => {
                debug!(call, fingerprint = fingerprint.short(), "[ScriptedBackend] Bound device");
                Ok(format!("anon-{}", fingerprint.short()))
            }
        }
    }
}

/// Merge coordinator that accepts every merge without doing anything.
#[derive(Debug, Default)]
pub struct NoOpMerge;

#[async_trait]
impl MergeCoordinator for NoOpMerge {
    async fn merge(&self, _from: &DeviceFingerprint, _into: &Session) -> Result<(), MergeError> {
        Ok(())
    }
}
