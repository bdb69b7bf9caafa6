//! # Alert Router
//!
//! Defines the publishing side of the alert bus.

use crate::events::{RoutedAlert, RoutingPolicy};
use crate::subscriber::{AlertHandler, AlertStream, ChannelHandler, Subscriber, SubscriptionId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::SecurityAlert;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Trait for publishing security alerts.
///
/// This is the interface subsystems use to raise alerts without depending
/// on the concrete router.
pub trait AlertPublisher: Send + Sync {
    /// Publish an alert.
    ///
    /// # Returns
    ///
    /// The number of handlers the alert was dispatched to.
    fn publish(&self, alert: SecurityAlert) -> usize;
}

/// How the router hands alerts to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Handlers run inline inside `publish`.
    #[default]
    Synchronous,
    /// Each subscription owns a FIFO queue drained by its own task.
    Asynchronous,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" | "synchronous" => Ok(Self::Synchronous),
            "async" | "asynchronous" => Ok(Self::Asynchronous),
            other => Err(format!("unknown delivery mode: {other}")),
        }
    }
}

/// Delivery counters shared with worker tasks.
#[derive(Debug, Default)]
pub struct RouterStats {
    published: AtomicU64,
    deliveries: AtomicU64,
    handler_failures: AtomicU64,
}

impl RouterStats {
    pub(crate) fn record_publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }
}

type Snapshot = Arc<Vec<Arc<Subscriber>>>;

/// Severity-tiered broadcast hub for security alerts.
///
/// Every alert reaches every handler registered at the moment of
/// publication. The subscriber list is copy-on-write: `subscribe` and
/// `unsubscribe` swap in a new list, and each `publish` works on the
/// snapshot it loaded, so it sees either the full old or the full new set.
pub struct AlertRouter {
    /// Current subscriber snapshot.
    subscribers: RwLock<Snapshot>,

    /// Severity routing table.
    policy: RoutingPolicy,

    /// Delivery mode for new subscriptions.
    mode: DeliveryMode,

    /// Next subscription id.
    next_id: AtomicU64,

    /// Delivery counters.
    stats: Arc<RouterStats>,
}

impl AlertRouter {
    /// Create a synchronous router with the default routing policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DeliveryMode::Synchronous, RoutingPolicy::default())
    }

    /// Create a router with the given delivery mode and policy.
    #[must_use]
    pub fn with_config(mode: DeliveryMode, policy: RoutingPolicy) -> Self {
        Self {
            subscribers: RwLock::new(Arc::new(Vec::new())),
            policy,
            mode,
            next_id: AtomicU64::new(1),
            stats: Arc::new(RouterStats::default()),
        }
    }

    /// Register a handler for all alerts published from now on.
    ///
    /// In asynchronous mode the handler's worker is spawned on the current
    /// tokio runtime; outside a runtime the handler falls back to inline
    /// delivery.
    pub fn subscribe(&self, handler: Arc<dyn AlertHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let name = handler.name().to_string();

        let subscriber = match self.mode {
            DeliveryMode::Synchronous => Subscriber::inline(id, handler),
            DeliveryMode::Asynchronous => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => Subscriber::queued(id, handler, &runtime, Arc::clone(&self.stats)),
                Err(_) => {
                    warn!(
                        subscription = %id,
                        handler = %name,
                        "[AlertRouter] No async runtime, delivering inline"
                    );
                    Subscriber::inline(id, handler)
                }
            },
        };

        {
            let mut current = self.subscribers.write();
            let mut next: Vec<Arc<Subscriber>> = Vec::clone(&current);
            next.push(Arc::new(subscriber));
            *current = Arc::new(next);
        }

        debug!(subscription = %id, handler = %name, "[AlertRouter] Subscribed");
        id
    }

    /// Convenience: subscribe a stream of alerts.
    pub fn subscribe_stream(&self) -> (SubscriptionId, AlertStream) {
        let (handler, stream) = ChannelHandler::new();
        (self.subscribe(Arc::new(handler)), stream)
    }

    /// Remove a subscription.
    ///
    /// Returns `false` if the id was unknown. In asynchronous mode alerts
    /// already queued for the handler are still delivered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        {
            let mut current = self.subscribers.write();
            if !current.iter().any(|s| s.id == id) {
                return false;
            }
            let next: Vec<Arc<Subscriber>> =
                current.iter().filter(|s| s.id != id).cloned().collect();
            *current = Arc::new(next);
        }

        debug!(subscription = %id, "[AlertRouter] Unsubscribed");
        true
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Delivery counters.
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Drop every subscription and wait for queued deliveries to finish.
    pub async fn shutdown(&self) {
        let drained: Snapshot = {
            let mut current = self.subscribers.write();
            std::mem::replace(&mut *current, Arc::new(Vec::new()))
        };

        let workers: Vec<_> = drained.iter().filter_map(|s| s.take_worker()).collect();
        // Senders close once the last snapshot referencing them is gone.
        drop(drained);

        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "[AlertRouter] Delivery worker aborted");
            }
        }
        info!("[AlertRouter] Shut down");
    }

    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.subscribers.read())
    }
}

impl Default for AlertRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertPublisher for AlertRouter {
    fn publish(&self, alert: SecurityAlert) -> usize {
        let routed: RoutedAlert = self.policy.route(alert);
        let snapshot = self.snapshot();
        self.stats.record_publish();

        debug!(
            severity = %routed.severity(),
            escalation = %routed.escalation,
            source = routed.alert.source(),
            receivers = snapshot.len(),
            "[AlertRouter] Alert published"
        );

        for subscriber in snapshot.iter() {
            subscriber.dispatch(&routed, &self.stats);
        }
        snapshot.len()
    }
}

impl<T: AlertPublisher + ?Sized> AlertPublisher for Arc<T> {
    fn publish(&self, alert: SecurityAlert) -> usize {
        (**self).publish(alert)
    }
}

/// Publisher that discards every alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPublisher;

impl AlertPublisher for NoOpPublisher {
    fn publish(&self, _alert: SecurityAlert) -> usize {
        0
    }
}
