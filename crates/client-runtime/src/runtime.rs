//! # Client Runtime
//!
//! Startup and shutdown of the client core.
//!
//! ```text
//! start() ── build registry ── run bootstrap ──► BootstrapReport (returned)
//!                                   │
//!                                   ├── spawn deferred identity + sync task
//!                                   └── schedule identity follower (login)
//! ```

use shared_types::{ConfigurationError, Contact};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use vc_02_contact_normalizer::{ContactApi, ContactError};
use vigil_telemetry::CONTACTS_LOADED;

use crate::bootstrap::{BootstrapError, BootstrapReport, BootstrapSequencer};
use crate::container::{ClientConfig, ClientContainer};
use crate::wiring::{follow_identity_changes, spawn_identity_task, DeferredOutcome};

/// Grace period background jobs get to stop on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

enum Deferred {
    NotStarted,
    Running(JoinHandle<DeferredOutcome>),
    Finished(DeferredOutcome),
}

/// The running client core.
pub struct ClientRuntime {
    container: Arc<ClientContainer>,
    sequencer: BootstrapSequencer,
    deferred: Mutex<Deferred>,
}

impl ClientRuntime {
    /// Validate `config` and build the container.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let container = Arc::new(ClientContainer::new(config));
        let sequencer = BootstrapSequencer::with_alerts(container.alerts.clone());
        Ok(Self {
            container,
            sequencer,
            deferred: Mutex::new(Deferred::NotStarted),
        })
    }

    pub fn container(&self) -> Arc<ClientContainer> {
        Arc::clone(&self.container)
    }

    /// Run the bootstrap sequence, then start identity resolution in the
    /// background.
    ///
    /// Returns as soon as the bootstrap report is final; the identity task
    /// is awaited separately with [`wait_for_identity`](Self::wait_for_identity).
    pub async fn start(&self) -> Result<BootstrapReport, StartupError> {
        info!("===========================================");
        info!("  Vigil Client Core v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let registry = self.container.build_registry()?;
        let report = self.sequencer.run(&registry).await?;

        let mut deferred = self.deferred.lock().await;
        if matches!(*deferred, Deferred::NotStarted) {
            if let Err(e) = follow_identity_changes(
                self.container.identity.clone(),
                self.container.sync.clone(),
                &self.container.tasks,
                self.container.shutdown_receiver(),
            ) {
                warn!(error = %e, "Identity follower not scheduled; sync will not follow login");
            }
            *deferred = Deferred::Running(spawn_identity_task(
                self.container.identity.clone(),
                self.container.sync.clone(),
                self.container.shutdown_receiver(),
            ));
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            degraded = report.is_degraded(),
            "Client core started"
        );
        Ok(report)
    }

    /// Wait for the deferred identity task. `None` if it was never started.
    pub async fn wait_for_identity(&self) -> Option<DeferredOutcome> {
        let mut deferred = self.deferred.lock().await;
        let outcome = match std::mem::replace(&mut *deferred, Deferred::NotStarted) {
            Deferred::NotStarted => return None,
            Deferred::Finished(outcome) => outcome,
            Deferred::Running(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "[Deferred] Identity task failed");
                    DeferredOutcome::Unresolved
                }
            },
        };
        *deferred = Deferred::Finished(outcome.clone());
        Some(outcome)
    }

    /// Load the normalized address book.
    pub async fn contacts(&self) -> Result<Vec<Contact>, ContactError> {
        let contacts = self.container.contacts.load_contacts().await?;
        CONTACTS_LOADED.inc_by(contacts.len() as u64);
        Ok(contacts)
    }

    /// Graceful shutdown.
    ///
    /// 1. Signal shutdown to background jobs and the deferred task
    /// 2. Join jobs, aborting any that outlive the grace period
    /// 3. Drain the alert router's delivery workers
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.container.signal_shutdown();

        self.container.tasks.join_all(SHUTDOWN_GRACE).await;

        if let Some(outcome) = self.wait_for_identity().await {
            if outcome == DeferredOutcome::Cancelled {
                warn!("Identity resolution cancelled by shutdown");
            }
        }

        self.container.alerts.shutdown().await;
        info!("Shutdown complete");
    }
}
