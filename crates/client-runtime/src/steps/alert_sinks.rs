//! # `alert-sinks` (OPTIONAL)
//!
//! Makes sure the log, metrics and notification sinks are subscribed to the
//! router. The container attaches them before bootstrap so that a CRITICAL
//! abort still reaches the user; the step re-attaches them if that failed
//! to happen.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{AlertHandler, AlertRouter, SubscriptionId};
use shared_types::{InitAction, SubsystemFailure};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::handlers::{LogSink, MetricsSink, NotificationCenter};

pub const STEP_NAME: &str = "alert-sinks";

/// Subscribe the standard sinks unless `subscriptions` already holds them.
///
/// Returns the number of sinks subscribed by this call.
pub fn attach_alert_sinks(
    router: &AlertRouter,
    notifications: &Arc<NotificationCenter>,
    subscriptions: &Mutex<Vec<SubscriptionId>>,
) -> usize {
    let mut subscriptions = subscriptions.lock();
    if !subscriptions.is_empty() {
        debug!(count = subscriptions.len(), "[AlertSinks] Already subscribed");
        return 0;
    }

    let sinks: [Arc<dyn AlertHandler>; 3] = [
        Arc::new(LogSink),
        Arc::new(MetricsSink),
        notifications.clone(),
    ];
    for sink in sinks {
        subscriptions.push(router.subscribe(sink));
    }

    info!(
        sinks = subscriptions.len(),
        mode = ?router.mode(),
        "[AlertSinks] Alert sinks subscribed"
    );
    subscriptions.len()
}

pub struct AlertSinksStep {
    router: Arc<AlertRouter>,
    notifications: Arc<NotificationCenter>,
    subscriptions: Arc<Mutex<Vec<SubscriptionId>>>,
}

impl AlertSinksStep {
    pub fn new(
        router: Arc<AlertRouter>,
        notifications: Arc<NotificationCenter>,
        subscriptions: Arc<Mutex<Vec<SubscriptionId>>>,
    ) -> Self {
        Self {
            router,
            notifications,
            subscriptions,
        }
    }
}

#[async_trait]
impl InitAction for AlertSinksStep {
    async fn run(&self) -> Result<(), SubsystemFailure> {
        let attached = attach_alert_sinks(&self.router, &self.notifications, &self.subscriptions);
        if attached > 0 {
            warn!(sinks = attached, "[AlertSinks] Sinks were missing before bootstrap");
        }
        Ok(())
    }
}
