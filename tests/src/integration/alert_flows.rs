//! # Alert Flows
//!
//! Delivery guarantees of the alert router in both delivery modes, and the
//! client's alert sinks fed from real subsystem alerts.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::Arc;

    use client_runtime::handlers::NotificationCenter;
    use shared_bus::{
        AlertHandler, AlertPublisher, AlertRouter, DeliveryMode, FnHandler, RoutedAlert, RoutingPolicy,
    };
    use shared_types::{HandlerFailure, SecurityAlert, Severity};

    fn alert(severity: Severity, message: &str) -> SecurityAlert {
        SecurityAlert::new(severity, "alert-flows", message)
    }

    fn recorder(seen: &Arc<Mutex<Vec<String>>>) -> Arc<dyn AlertHandler> {
        let seen = seen.clone();
        Arc::new(FnHandler::new("recorder", move |alert: &RoutedAlert| {
            seen.lock().push(alert.alert.message().to_string());
            Ok(())
        }))
    }

    #[test]
    fn test_every_handler_receives_every_alert() {
        let router = AlertRouter::new();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        router.subscribe(recorder(&first));
        router.subscribe(recorder(&second));

        assert_eq!(router.publish(alert(Severity::Low, "one")), 2);
        assert_eq!(router.publish(alert(Severity::High, "two")), 2);

        assert_eq!(*first.lock(), vec!["one", "two"]);
        assert_eq!(*second.lock(), vec!["one", "two"]);
    }

    #[test]
    fn test_failing_and_panicking_handlers_are_isolated() {
        let router = AlertRouter::new();
        router.subscribe(Arc::new(FnHandler::new("failing", |_: &RoutedAlert| {
            Err(HandlerFailure::new("disk full"))
        })));
        router.subscribe(Arc::new(FnHandler::new(
            "panicking",
            |_: &RoutedAlert| -> Result<(), HandlerFailure> { panic!("sink bug") },
        )));
        let seen = Arc::new(Mutex::new(Vec::new()));
        router.subscribe(recorder(&seen));

        router.publish(alert(Severity::Critical, "tamper"));

        assert_eq!(*seen.lock(), vec!["tamper"]);
        assert_eq!(router.stats().handler_failures(), 2);
        assert_eq!(router.stats().deliveries(), 1);
    }

    #[test]
    fn test_late_subscriber_gets_no_earlier_alerts() {
        let router = AlertRouter::new();
        router.publish(alert(Severity::Low, "before"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        router.subscribe(recorder(&seen));
        router.publish(alert(Severity::Low, "after"));

        assert_eq!(*seen.lock(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_async_delivery_preserves_order() {
        let router = AlertRouter::with_config(DeliveryMode::Asynchronous, RoutingPolicy::default());
        let (_, mut stream) = router.subscribe_stream();

        for i in 0..50 {
            router.publish(alert(Severity::Low, &format!("alert-{i}")));
        }

        for i in 0..50 {
            let routed = stream.recv().await.unwrap();
            assert_eq!(routed.alert.message(), format!("alert-{i}"));
        }
        router.shutdown().await;
    }

    #[test]
    fn test_notifications_follow_escalation() {
        let router = AlertRouter::new();
        let notifications = Arc::new(NotificationCenter::new());
        router.subscribe(notifications.clone());

        router.publish(alert(Severity::Medium, "noise"));
        router.publish(alert(Severity::Critical, "hook detected"));

        let notices = notifications.drain();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].requires_ack);
        assert_eq!(notifications.pending(), 0);
    }
}
