//! # Bootstrap Flows
//!
//! The failure policy of the sequencer over hand-built registries:
//!
//! 1. A CRITICAL failure aborts and later steps never run
//! 2. OPTIONAL failures (errors or panics) never abort
//! 3. Steps run in registration order, each exactly once

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::Arc;

    use client_runtime::{run_bootstrap, BootstrapSequencer};
    use shared_bus::{AlertRouter, FnHandler, RoutedAlert};
    use shared_types::{
        ConfigurationError, Criticality, InitStep, Severity, SubsystemFailure, SubsystemRegistry,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Trace = Arc<Mutex<Vec<String>>>;

    fn recording(name: &str, criticality: Criticality, trace: &Trace, ok: bool) -> InitStep {
        let trace = trace.clone();
        let step = name.to_string();
        InitStep::from_fn(name, criticality, move || {
            trace.lock().push(step.clone());
            if ok {
                Ok(())
            } else {
                Err(SubsystemFailure::initialization(format!("{step} failed")))
            }
        })
    }

    // =============================================================================
    // CRITICAL FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_critical_failure_leaves_later_steps_unrun() {
        let trace = Trace::default();
        let registry = SubsystemRegistry::from_steps([
            recording("security-config", Criticality::Critical, &trace, false),
            recording("cache", Criticality::Optional, &trace, true),
        ])
        .unwrap();

        let err = run_bootstrap(&registry).await.unwrap_err();

        assert_eq!(err.step(), "security-config");
        assert!(err.report().aborted);
        assert!(!err.report().was_executed("cache"));
        assert_eq!(*trace.lock(), vec!["security-config".to_string()]);
    }

    #[tokio::test]
    async fn test_critical_failure_is_alerted() {
        let router = Arc::new(AlertRouter::new());
        let (_, mut alerts) = router.subscribe_stream();
        let trace = Trace::default();
        let registry = SubsystemRegistry::from_steps([recording(
            "security-config",
            Criticality::Critical,
            &trace,
            false,
        )])
        .unwrap();

        let sequencer = BootstrapSequencer::with_alerts(router.clone());
        assert!(sequencer.run(&registry).await.is_err());

        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.severity(), Severity::Critical);
    }

    // =============================================================================
    // OPTIONAL FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_all_optional_registry_never_aborts() {
        let trace = Trace::default();
        let registry = SubsystemRegistry::from_steps([
            recording("alert-sinks", Criticality::Optional, &trace, false),
            recording("cache", Criticality::Optional, &trace, false),
            InitStep::from_fn("scheduler", Criticality::Optional, || -> Result<(), SubsystemFailure> {
                panic!("scheduler exploded")
            }),
            recording("security-monitor", Criticality::Optional, &trace, true),
        ])
        .unwrap();

        let report = run_bootstrap(&registry).await.unwrap();

        assert!(!report.aborted);
        assert!(report.is_degraded());
        assert_eq!(report.failed.len(), 3);
        assert!(report.has_succeeded("security-monitor"));
        assert_eq!(
            report.executed,
            vec!["alert-sinks", "cache", "scheduler", "security-monitor"]
        );
    }

    #[tokio::test]
    async fn test_optional_failure_alert_reaches_subscribers() {
        let router = Arc::new(AlertRouter::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        router.subscribe(Arc::new(FnHandler::new("recorder", move |alert: &RoutedAlert| {
            sink.lock().push(alert.severity());
            Ok(())
        })));

        let trace = Trace::default();
        let registry =
            SubsystemRegistry::from_steps([recording("cache", Criticality::Optional, &trace, false)])
                .unwrap();
        BootstrapSequencer::with_alerts(router.clone())
            .run(&registry)
            .await
            .unwrap();

        assert_eq!(*seen.lock(), vec![Severity::Medium]);
    }

    // =============================================================================
    // ORDERING AND REGISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_each_step_runs_once_in_order() {
        let trace = Trace::default();
        let names = ["a", "b", "c", "d"];
        let registry = SubsystemRegistry::from_steps(
            names
                .iter()
                .map(|n| recording(n, Criticality::Optional, &trace, true)),
        )
        .unwrap();

        let report = run_bootstrap(&registry).await.unwrap();

        assert_eq!(*trace.lock(), names.map(String::from).to_vec());
        assert_eq!(report.succeeded.len(), 4);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_duplicate_step_name_rejected() {
        let trace = Trace::default();
        let result = SubsystemRegistry::from_steps([
            recording("cache", Criticality::Optional, &trace, true),
            recording("cache", Criticality::Critical, &trace, true),
        ]);
        assert!(matches!(result, Err(ConfigurationError::DuplicateStep(_))));
    }
}
