//! # Client Flows
//!
//! The full runtime as the `vigil-client` binary wires it, over a temporary
//! data directory.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tempfile::TempDir;

    use client_runtime::{ClientConfig, ClientRuntime, DeferredOutcome, StartupError};
    use shared_types::IdentityState;
    use vc_01_identity_resolver::IdentityApi;

    const PIN: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn config(dir: &TempDir, pins: &[&str]) -> ClientConfig {
        ClientConfig::from_lookup(|key| match key {
            "VIGIL_DATA_DIR" => Some(dir.path().display().to_string()),
            "VIGIL_PINNING_KEYS" => Some(pins.join(",")),
            "VIGIL_SYNC_INTERVAL_SECS" => Some("1".into()),
            _ => None,
        })
        .map(|mut config| {
            config.storage.min_free_bytes = 0;
            config
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_startup_resolves_anonymous_identity() {
        let dir = TempDir::new().unwrap();
        let runtime = ClientRuntime::new(config(&dir, &[PIN])).unwrap();

        let report = runtime.start().await.unwrap();
        assert!(!report.aborted);
        assert_eq!(
            report.executed,
            vec!["security-config", "alert-sinks", "cache", "security-monitor", "scheduler"]
        );

        let container = runtime.container();
        assert!(container.cache.is_available());
        assert_eq!(container.alert_subscriptions.lock().len(), 3);

        let identity = match runtime.wait_for_identity().await {
            Some(DeferredOutcome::Ready(identity)) => identity,
            other => panic!("identity not ready: {other:?}"),
        };
        assert!(identity.is_anonymous());
        assert_eq!(container.identity.current(), identity);
        assert_eq!(container.sync.identity(), Some(identity));

        // The recurring sync job runs once sync is initialized.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(container.sync.passes() >= 1);

        runtime.shutdown().await;
        assert!(container.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_restart_keeps_identity() {
        let dir = TempDir::new().unwrap();

        let first = ClientRuntime::new(config(&dir, &[PIN])).unwrap();
        first.start().await.unwrap();
        let before = first.wait_for_identity().await;
        first.shutdown().await;

        let second = ClientRuntime::new(config(&dir, &[PIN])).unwrap();
        second.start().await.unwrap();
        let after = second.wait_for_identity().await;
        second.shutdown().await;

        assert!(matches!(before, Some(DeferredOutcome::Ready(IdentityState::Anonymous(_)))));
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_bad_pin_aborts_before_optional_steps() {
        let dir = TempDir::new().unwrap();
        let runtime = ClientRuntime::new(config(&dir, &["not-hex"])).unwrap();

        let err = match runtime.start().await {
            Err(StartupError::Bootstrap(err)) => err,
            other => panic!("startup should abort: {other:?}"),
        };
        assert_eq!(err.step(), "security-config");
        assert_eq!(err.report().executed, vec!["security-config"]);
        assert!(!runtime.container().cache.is_available());
        assert!(runtime.container().tasks.is_empty());
        // The abort is shown to the user even though no OPTIONAL step ran.
        assert!(runtime.container().notifications.has_blocking_notice());
    }

    #[tokio::test]
    async fn test_zero_cache_capacity_degrades_only_the_cache() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, &[PIN]);
        config.cache.capacity = 0;
        let runtime = ClientRuntime::new(config).unwrap();

        let report = runtime.start().await.unwrap();

        assert!(report.is_degraded());
        assert!(report.failure("cache").is_some());
        assert!(report.has_succeeded("scheduler"));
        runtime.shutdown().await;
    }
}
