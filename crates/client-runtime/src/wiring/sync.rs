//! # Sync Collaborator
//!
//! The contract the runtime needs from the data sync layer: start syncing
//! for a resolved identity, run one sync pass, and carry anonymous data over
//! on login. The network side is not part of the client core;
//! [`LocalSyncService`] keeps the bookkeeping so the rest of the runtime can
//! be exercised end to end.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DeviceFingerprint, IdentityState, Session};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info};
use vc_01_identity_resolver::{MergeCoordinator, MergeError};

/// Sync errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Sync not initialized: no identity yet")]
    NotInitialized,

    #[error("Cannot sync without a resolved identity")]
    UnresolvedIdentity,

    #[error("Sync backend error: {0}")]
    Backend(String),
}

/// Data sync layer (Driven Port)
#[async_trait]
pub trait SyncService: Send + Sync {
    /// Start syncing for `identity`.
    async fn initialize(&self, identity: &IdentityState) -> Result<(), SyncError>;

    /// Run one sync pass.
    async fn sync_once(&self) -> Result<(), SyncError>;
}

/// In-process sync bookkeeping.
#[derive(Default)]
pub struct LocalSyncService {
    identity: RwLock<Option<IdentityState>>,
    passes: AtomicU64,
    merges: AtomicU64,
}

impl LocalSyncService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<IdentityState> {
        self.identity.read().clone()
    }

    /// Completed sync passes.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    pub fn merges(&self) -> u64 {
        self.merges.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SyncService for LocalSyncService {
    async fn initialize(&self, identity: &IdentityState) -> Result<(), SyncError> {
        if !identity.is_resolved() {
            return Err(SyncError::UnresolvedIdentity);
        }
        *self.identity.write() = Some(identity.clone());
        info!(identity = identity.label(), "[Sync] Initialized");
        Ok(())
    }

    async fn sync_once(&self) -> Result<(), SyncError> {
        let identity = self.identity.read().clone().ok_or(SyncError::NotInitialized)?;
        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(pass, identity = identity.label(), "[Sync] Pass complete");
        Ok(())
    }
}

#[async_trait]
impl MergeCoordinator for LocalSyncService {
    async fn merge(&self, from: &DeviceFingerprint, _into: &Session) -> Result<(), MergeError> {
        self.merges.fetch_add(1, Ordering::Relaxed);
        info!(fingerprint = from.short(), "[Sync] Anonymous data carried over to account");
        Ok(())
    }
}
