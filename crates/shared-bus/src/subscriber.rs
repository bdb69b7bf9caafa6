//! # Alert Subscribers
//!
//! Defines the handler side of the alert router.

use crate::events::RoutedAlert;
use crate::publisher::RouterStats;
use shared_types::HandlerFailure;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A consumer of security alerts.
///
/// Errors and panics raised here are contained by the router; they are
/// never seen by the publisher or by other handlers.
pub trait AlertHandler: Send + Sync {
    fn handle(&self, alert: &RoutedAlert) -> Result<(), HandlerFailure>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "anonymous-handler"
    }
}

/// Adapter turning a closure into an [`AlertHandler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&RoutedAlert) -> Result<(), HandlerFailure> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> AlertHandler for FnHandler<F>
where
    F: Fn(&RoutedAlert) -> Result<(), HandlerFailure> + Send + Sync,
{
    fn handle(&self, alert: &RoutedAlert) -> Result<(), HandlerFailure> {
        (self.f)(alert)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handler that forwards every alert into a channel.
///
/// Backs [`AlertStream`]; a closed receiver is reported as a handler failure.
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<RoutedAlert>,
}

impl ChannelHandler {
    /// Create a handler and the stream it feeds.
    pub fn new() -> (Self, AlertStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self { sender },
            AlertStream {
                inner: UnboundedReceiverStream::new(receiver),
            },
        )
    }
}

impl AlertHandler for ChannelHandler {
    fn handle(&self, alert: &RoutedAlert) -> Result<(), HandlerFailure> {
        self.sender
            .send(alert.clone())
            .map_err(|_| HandlerFailure::new("alert stream receiver dropped"))
    }

    fn name(&self) -> &str {
        "alert-stream"
    }
}

/// Stream of routed alerts, in publication order.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct AlertStream {
    inner: UnboundedReceiverStream<RoutedAlert>,
}

impl AlertStream {
    /// Receive the next alert, or `None` once the subscription is gone.
    pub async fn recv(&mut self) -> Option<RoutedAlert> {
        self.inner.as_mut().recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<RoutedAlert> {
        self.inner.as_mut().try_recv().ok()
    }
}

impl Stream for AlertStream {
    type Item = RoutedAlert;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// A registered handler and, in asynchronous mode, its delivery queue.
pub(crate) struct Subscriber {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: Arc<dyn AlertHandler>,
    pub(crate) queue: Option<mpsc::UnboundedSender<RoutedAlert>>,
    pub(crate) worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Subscriber {
    /// Subscriber delivered inline by the publisher.
    pub(crate) fn inline(id: SubscriptionId, handler: Arc<dyn AlertHandler>) -> Self {
        Self {
            id,
            handler,
            queue: None,
            worker: parking_lot::Mutex::new(None),
        }
    }

    /// Subscriber with its own FIFO queue drained by a worker task.
    pub(crate) fn queued(
        id: SubscriptionId,
        handler: Arc<dyn AlertHandler>,
        runtime: &tokio::runtime::Handle,
        stats: Arc<RouterStats>,
    ) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<RoutedAlert>();
        let worker_handler = Arc::clone(&handler);
        let worker = runtime.spawn(async move {
            while let Some(alert) = rx.recv().await {
                deliver(id, worker_handler.as_ref(), &alert, &stats);
            }
            debug!(subscription = %id, "[AlertRouter] Delivery worker drained");
        });

        Self {
            id,
            handler,
            queue: Some(queue),
            worker: parking_lot::Mutex::new(Some(worker)),
        }
    }

    /// Hand an alert to this subscriber.
    pub(crate) fn dispatch(&self, alert: &RoutedAlert, stats: &RouterStats) {
        match &self.queue {
            None => deliver(self.id, self.handler.as_ref(), alert, stats),
            Some(queue) => {
                if queue.send(alert.clone()).is_err() {
                    stats.record_failure();
                    warn!(
                        subscription = %self.id,
                        handler = self.handler.name(),
                        "[AlertRouter] Delivery worker gone, alert dropped"
                    );
                }
            }
        }
    }

    pub(crate) fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.worker.lock().take()
    }
}

/// Invoke a handler, containing its errors and panics.
pub(crate) fn deliver(
    id: SubscriptionId,
    handler: &dyn AlertHandler,
    alert: &RoutedAlert,
    stats: &RouterStats,
) {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(alert))) {
        Ok(Ok(())) => stats.record_delivery(),
        Ok(Err(e)) => {
            stats.record_failure();
            warn!(
                subscription = %id,
                handler = handler.name(),
                severity = %alert.severity(),
                error = %e,
                "[AlertRouter] Handler failed"
            );
        }
        Err(payload) => {
            stats.record_failure();
            warn!(
                subscription = %id,
                handler = handler.name(),
                severity = %alert.severity(),
                panic = panic_message(payload.as_ref()),
                "[AlertRouter] Handler panicked"
            );
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
