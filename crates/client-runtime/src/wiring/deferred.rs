//! # Deferred Identity Task
//!
//! Identity resolution and sync initialization run after the bootstrap
//! critical path has returned. Nothing here can change the bootstrap report
//! that was already handed to the caller.
//!
//! The task stops at the next await point once shutdown is signalled.
//! Identity files are only replaced by atomic rename, so stopping
//! mid-resolution leaves the previous state on disk.
//!
//! A separate background job follows later identity changes (login) and
//! re-initializes sync under the new identity.

use shared_types::{IdentityState, SubsystemFailure};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vc_01_identity_resolver::IdentityApi;
use vigil_telemetry::IDENTITY_RESOLUTIONS;

use super::sync::SyncService;
use super::tasks::{shutdown_signalled, BackgroundTasks};

/// Job name of the identity follower.
pub const FOLLOW_JOB: &str = "identity-follower";

/// How the deferred task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredOutcome {
    /// Identity resolved and sync initialized.
    Ready(IdentityState),
    /// Identity could not be resolved; sync was not started.
    Unresolved,
    /// Identity resolved but sync initialization failed.
    SyncFailed { identity: IdentityState, error: String },
    /// Shutdown arrived first.
    Cancelled,
}

async fn resolve_and_sync(identity: Arc<dyn IdentityApi>, sync: Arc<dyn SyncService>) -> DeferredOutcome {
    let state = identity.resolve().await;
    IDENTITY_RESOLUTIONS.with_label_values(&[state.label()]).inc();

    if !state.is_resolved() {
        warn!("[Deferred] Identity unresolved, sync not started");
        return DeferredOutcome::Unresolved;
    }

    match sync.initialize(&state).await {
        Ok(()) => {
            info!(identity = state.label(), "[Deferred] Identity ready");
            DeferredOutcome::Ready(state)
        }
        Err(e) => {
            warn!(identity = state.label(), error = %e, "[Deferred] Sync initialization failed");
            DeferredOutcome::SyncFailed {
                identity: state,
                error: e.to_string(),
            }
        }
    }
}

/// Spawn identity resolution followed by sync initialization.
pub fn spawn_identity_task(
    identity: Arc<dyn IdentityApi>,
    sync: Arc<dyn SyncService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<DeferredOutcome> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = shutdown_signalled(&mut shutdown) => {
                info!("[Deferred] Shutdown signal received");
                DeferredOutcome::Cancelled
            }
            outcome = resolve_and_sync(identity, sync) => outcome,
        }
    })
}

/// Schedule a job that re-initializes sync whenever the identity changes
/// to a resolved state, until shutdown.
pub fn follow_identity_changes(
    identity: Arc<dyn IdentityApi>,
    sync: Arc<dyn SyncService>,
    tasks: &BackgroundTasks,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), SubsystemFailure> {
    let mut updates = identity.watch();

    tasks.spawn(FOLLOW_JOB, async move {
        loop {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    if !state.is_resolved() {
                        continue;
                    }
                    match sync.initialize(&state).await {
                        Ok(()) => {
                            info!(identity = state.label(), "[Deferred] Sync follows new identity");
                        }
                        Err(e) => {
                            warn!(
                                identity = state.label(),
                                error = %e,
                                "[Deferred] Sync re-initialization failed"
                            );
                        }
                    }
                }
            }
        }
        debug!("[Deferred] Identity follower stopped");
    })
}
