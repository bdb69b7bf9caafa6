//! # `scheduler` (OPTIONAL)
//!
//! Schedules the recurring sync job and returns. The job skips passes until
//! the deferred identity task has initialized sync.

use async_trait::async_trait;
use shared_types::{InitAction, SubsystemFailure};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::wiring::{shutdown_signalled, BackgroundTasks, SyncError, SyncService};

pub const STEP_NAME: &str = "scheduler";
pub const SYNC_JOB: &str = "recurring-sync";

pub struct SchedulerStep {
    sync: Arc<dyn SyncService>,
    interval: Duration,
    tasks: Arc<BackgroundTasks>,
    shutdown: watch::Receiver<bool>,
}

impl SchedulerStep {
    pub fn new(
        sync: Arc<dyn SyncService>,
        interval: Duration,
        tasks: Arc<BackgroundTasks>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            sync,
            interval,
            tasks,
            shutdown,
        }
    }
}

async fn sync_pass(sync: &dyn SyncService) {
    match sync.sync_once().await {
        Ok(()) => {}
        Err(SyncError::NotInitialized) => debug!("[Scheduler] Sync not ready, pass skipped"),
        Err(e) => warn!(error = %e, "[Scheduler] Sync pass failed"),
    }
}

#[async_trait]
impl InitAction for SchedulerStep {
    async fn run(&self) -> Result<(), SubsystemFailure> {
        if self.interval.is_zero() {
            return Err(SubsystemFailure::misconfigured("sync interval is zero"));
        }

        let sync = Arc::clone(&self.sync);
        let period = self.interval;
        let mut shutdown = self.shutdown.clone();

        self.tasks.spawn(SYNC_JOB, async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_signalled(&mut shutdown) => {
                        debug!("[Scheduler] Shutdown signal received");
                        break;
                    }
                    _ = ticker.tick() => sync_pass(sync.as_ref()).await,
                }
            }
        })?;

        info!(interval_secs = period.as_secs(), "[Scheduler] Recurring sync scheduled");
        Ok(())
    }
}
