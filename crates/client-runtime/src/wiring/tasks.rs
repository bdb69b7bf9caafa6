//! # Background Tasks
//!
//! Registry of long-running jobs spawned by init steps. Steps only schedule
//! work here and return; the runtime joins the jobs on shutdown.

use parking_lot::Mutex;
use shared_types::SubsystemFailure;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Resolves once `true` is sent on `shutdown`.
///
/// A dropped sender is not a shutdown request; the future then never
/// resolves.
pub async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Named background jobs.
#[derive(Default)]
pub struct BackgroundTasks {
    handles: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `job` under `name` on the current runtime.
    ///
    /// A job that is already running under the same name is left alone, so
    /// a repeated bootstrap never doubles a schedule.
    pub fn spawn<F>(&self, name: &str, job: F) -> Result<(), SubsystemFailure>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SubsystemFailure::unavailable(format!("no async runtime: {e}")))?;

        let mut handles = self.handles.lock();
        if handles
            .iter()
            .any(|(existing, handle)| existing == name && !handle.is_finished())
        {
            debug!(job = name, "[Tasks] Already scheduled");
            return Ok(());
        }

        handles.retain(|(existing, _)| existing != name);
        handles.push((name.to_string(), runtime.spawn(job)));
        debug!(job = name, "[Tasks] Scheduled");
        Ok(())
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.handles
            .lock()
            .iter()
            .any(|(existing, handle)| existing == name && !handle.is_finished())
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every job to stop, aborting those still running after `grace`.
    pub async fn join_all(&self, grace: Duration) {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock());

        for (name, mut handle) in handles {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => debug!(job = %name, "[Tasks] Stopped"),
                Ok(Err(e)) => warn!(job = %name, error = %e, "[Tasks] Job ended abnormally"),
                Err(_) => {
                    warn!(job = %name, "[Tasks] Job ignored shutdown, aborting");
                    handle.abort();
                }
            }
        }
    }
}


#[cfg(test)]
mod shutdown_tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_already_sent() {
        let (_tx, mut rx) = watch::channel(true);
        shutdown_signalled(&mut rx).await;
    }

    #[tokio::test]
    async fn test_dropped_sender_is_not_a_signal() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let waited =
            tokio::time::timeout(Duration::from_millis(20), shutdown_signalled(&mut rx)).await;
        assert!(waited.is_err());
    }
}
