//! # Identity Flows
//!
//! The identity fallback chain over real files in a temporary data
//! directory, across simulated relaunches.
//!
//! ## Flow Tested:
//!
//! 1. **First launch**: fingerprint bound through the backend and persisted
//! 2. **Relaunch**: persisted binding reused, same anonymous identity
//! 3. **Login**: anonymous data merged, session persisted, next launch
//!    resolves authenticated

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    use client_runtime::wiring::LocalSyncService;
    use shared_bus::{AlertPublisher, AlertRouter};
    use shared_types::{IdentityState, Session, SessionToken, Severity};
    use vc_01_identity_resolver::adapters::{
        FileBindingStore, FileFailureLedger, FileSessionStore, ScriptedBackend,
        StaticDeviceAttributes, SystemClock, UnavailableDeviceAttributes, BINDING_FILE,
        FAILURES_FILE,
    };
    use vc_01_identity_resolver::{
        BackendError, DeviceAttributeSource, DeviceAttributes, FailureLedger, IdentityApi,
        IdentityBackend, IdentityConfig, IdentityDependencies, IdentityResolver, SessionStore,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn device() -> Arc<dyn DeviceAttributeSource> {
        Arc::new(StaticDeviceAttributes::new(DeviceAttributes {
            install_id: "install-7c1e".into(),
            hardware_id: "hw-42".into(),
            manufacturer: "Acme".into(),
            model: "Phone 3".into(),
            os_family: "android".into(),
        }))
    }

    /// One "launch" of the client over `dir`.
    fn launch(
        dir: &TempDir,
        attributes: Arc<dyn DeviceAttributeSource>,
        backend: Arc<dyn IdentityBackend>,
        sync: Arc<LocalSyncService>,
        alerts: Arc<AlertRouter>,
    ) -> IdentityResolver {
        IdentityResolver::new(
            IdentityDependencies {
                sessions: Arc::new(FileSessionStore::in_dir(dir.path())),
                bindings: Arc::new(FileBindingStore::in_dir(dir.path())),
                attributes,
                backend,
                merger: sync,
                failures: Arc::new(FileFailureLedger::in_dir(dir.path())),
                clock: Arc::new(SystemClock),
            },
            alerts,
            IdentityConfig::default(),
        )
    }

    fn session(valid_for: Duration) -> Session {
        Session::new(SessionToken::new("tok-123"), Utc::now() + valid_for)
    }

    // =============================================================================
    // RELAUNCH
    // =============================================================================

    #[tokio::test]
    async fn test_relaunch_resolves_same_anonymous_identity() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(ScriptedBackend::new());
        let alerts = Arc::new(AlertRouter::new());

        let first = launch(&dir, device(), backend.clone(), Arc::default(), alerts.clone())
            .resolve()
            .await;
        assert!(first.is_anonymous());
        assert!(dir.path().join(BINDING_FILE).exists());

        let second = launch(&dir, device(), backend.clone(), Arc::default(), alerts)
            .resolve()
            .await;

        assert_eq!(first, second);
        assert_eq!(backend.bind_calls(), 1);
    }

    #[tokio::test]
    async fn test_repeated_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(ScriptedBackend::new());
        let resolver = launch(&dir, device(), backend.clone(), Arc::default(), Arc::default());

        let states = [
            resolver.resolve().await,
            resolver.resolve().await,
            resolver.resolve().await,
        ];

        assert!(states.iter().all(|s| *s == states[0]));
        assert_eq!(backend.bind_calls(), 1);
    }

    // =============================================================================
    // SESSIONS
    // =============================================================================

    #[tokio::test]
    async fn test_persisted_session_wins() {
        let dir = TempDir::new().unwrap();
        FileSessionStore::in_dir(dir.path())
            .save(&session(Duration::hours(1)))
            .unwrap();

        let state = launch(&dir, device(), Arc::new(ScriptedBackend::new()), Arc::default(), Arc::default())
            .resolve()
            .await;

        assert_eq!(state, IdentityState::Authenticated(SessionToken::new("tok-123")));
    }

    #[tokio::test]
    async fn test_expired_session_falls_back_with_low_alert() {
        let dir = TempDir::new().unwrap();
        FileSessionStore::in_dir(dir.path())
            .save(&session(Duration::hours(-1)))
            .unwrap();
        let alerts = Arc::new(AlertRouter::new());
        let (_, mut stream) = alerts.subscribe_stream();

        let state = launch(&dir, device(), Arc::new(ScriptedBackend::new()), Arc::default(), alerts)
            .resolve()
            .await;

        assert!(state.is_anonymous());
        let alert = stream.recv().await.unwrap();
        assert_eq!(alert.severity(), Severity::Low);
        assert_eq!(alert.alert.source(), "identity-resolver");
    }

    #[tokio::test]
    async fn test_login_merges_and_survives_relaunch() {
        let dir = TempDir::new().unwrap();
        let sync = Arc::new(LocalSyncService::new());
        let backend = Arc::new(ScriptedBackend::new());

        let resolver = launch(&dir, device(), backend.clone(), sync.clone(), Arc::default());
        assert!(resolver.resolve().await.is_anonymous());

        let promoted = resolver.promote(session(Duration::hours(1))).await.unwrap();
        assert!(promoted.is_authenticated());
        assert_eq!(sync.merges(), 1);
        assert_eq!(resolver.current(), promoted);

        let relaunched = launch(&dir, device(), backend, sync.clone(), Arc::default())
            .resolve()
            .await;
        assert_eq!(relaunched, promoted);
        assert_eq!(sync.merges(), 1);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_every_layer_failing_is_unresolved_and_escalates() {
        let dir = TempDir::new().unwrap();
        let alerts = Arc::new(AlertRouter::new());
        let (_, mut stream) = alerts.subscribe_stream();
        let resolver = launch(
            &dir,
            Arc::new(UnavailableDeviceAttributes::new("permission revoked")),
            Arc::new(ScriptedBackend::new()),
            Arc::default(),
            alerts,
        );

        assert_eq!(resolver.resolve().await, IdentityState::Unresolved);
        assert_eq!(resolver.resolve().await, IdentityState::Unresolved);

        assert_eq!(stream.recv().await.unwrap().severity(), Severity::Low);
        assert_eq!(stream.recv().await.unwrap().severity(), Severity::High);
    }

    #[tokio::test]
    async fn test_failing_launches_escalate_to_high() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(ScriptedBackend::new());
        backend.fail_with(BackendError::Unreachable("offline".into()));

        let mut severities = Vec::new();
        for _ in 0..3 {
            let alerts = Arc::new(AlertRouter::new());
            let (_, mut stream) = alerts.subscribe_stream();
            let state = launch(&dir, device(), backend.clone(), Arc::default(), alerts)
                .resolve()
                .await;
            assert_eq!(state, IdentityState::Unresolved);
            severities.push(stream.recv().await.unwrap().severity());
        }

        assert_eq!(severities, vec![Severity::Low, Severity::High, Severity::High]);
        assert!(dir.path().join(FAILURES_FILE).exists());

        backend.succeed();
        let recovered = launch(&dir, device(), backend.clone(), Arc::default(), Arc::default())
            .resolve()
            .await;
        assert!(recovered.is_anonymous());
        assert_eq!(FileFailureLedger::in_dir(dir.path()).load().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_backend_outage_then_recovery() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(ScriptedBackend::new());
        backend.fail_with(BackendError::Unreachable("timeout".into()));
        let resolver = launch(&dir, device(), backend.clone(), Arc::default(), Arc::default());

        assert_eq!(resolver.resolve().await, IdentityState::Unresolved);
        assert!(!dir.path().join(BINDING_FILE).exists());

        backend.succeed();
        assert!(resolver.resolve().await.is_anonymous());
        assert_eq!(backend.bind_calls(), 2);
    }
}
