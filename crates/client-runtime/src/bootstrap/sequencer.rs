//! # Bootstrap Sequencer
//!
//! Walks the registry once, in order, applying one failure policy:
//!
//! | Criticality | On failure |
//! |-------------|------------|
//! | OPTIONAL | record, alert (MEDIUM), continue |
//! | CRITICAL | record, alert (CRITICAL), stop, return `BootstrapError` |
//!
//! Each action runs in its own task so a panicking step is recorded as a
//! failure of that step instead of taking the sequencer down. The sequencer
//! still awaits every step before starting the next one.

use shared_bus::{panic_message, AlertPublisher, NoOpPublisher};
use shared_types::{
    Criticality, InitStep, SecurityAlert, Severity, SubsystemFailure, SubsystemRegistry,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn, Instrument};
use vigil_telemetry::{
    subsystem_span, time_histogram, BOOTSTRAP_ABORTS, BOOTSTRAP_DURATION, BOOTSTRAP_STEPS,
};

use super::report::BootstrapReport;

const ALERT_SOURCE: &str = "bootstrap";

/// A CRITICAL step failed; startup cannot continue.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Critical init step '{step}' failed: {source}")]
    CriticalStepFailed {
        step: String,
        #[source]
        source: SubsystemFailure,
        /// Report up to and including the failed step.
        report: Box<BootstrapReport>,
    },
}

impl BootstrapError {
    /// Name of the step that aborted startup.
    pub fn step(&self) -> &str {
        match self {
            Self::CriticalStepFailed { step, .. } => step,
        }
    }

    pub fn report(&self) -> &BootstrapReport {
        match self {
            Self::CriticalStepFailed { report, .. } => report,
        }
    }
}

/// Runs a [`SubsystemRegistry`].
pub struct BootstrapSequencer {
    alerts: Arc<dyn AlertPublisher>,
}

impl Default for BootstrapSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapSequencer {
    /// Sequencer that reports failures through logs and metrics only.
    pub fn new() -> Self {
        Self {
            alerts: Arc::new(NoOpPublisher),
        }
    }

    /// Also publish step failures as security alerts.
    pub fn with_alerts(alerts: Arc<dyn AlertPublisher>) -> Self {
        Self { alerts }
    }

    /// Execute every step once, in registry order.
    ///
    /// Returns the report, or `BootstrapError` if a CRITICAL step failed. No
    /// step after a failed CRITICAL step runs.
    pub async fn run(&self, registry: &SubsystemRegistry) -> Result<BootstrapReport, BootstrapError> {
        // Observed into BOOTSTRAP_DURATION when dropped, on every return path.
        let timer = time_histogram!(BOOTSTRAP_DURATION);
        let mut report = BootstrapReport::new();

        info!(steps = registry.len(), "[Bootstrap] Starting");

        for step in registry.steps() {
            let outcome = execute(step)
                .instrument(subsystem_span!(
                    "bootstrap_step",
                    step = step.name(),
                    criticality = %step.criticality()
                ))
                .await;

            match outcome {
                Ok(()) => {
                    BOOTSTRAP_STEPS.with_label_values(&[step.name(), "succeeded"]).inc();
                    info!(step = step.name(), "[Bootstrap] Step succeeded");
                    report.record_success(step.name());
                }
                Err(failure) => {
                    BOOTSTRAP_STEPS.with_label_values(&[step.name(), "failed"]).inc();
                    report.record_failure(step.name(), failure.clone());

                    match step.criticality() {
                        Criticality::Optional => {
                            warn!(
                                step = step.name(),
                                error = %failure,
                                "[Bootstrap] Optional step failed, continuing degraded"
                            );
                            self.alerts.publish(SecurityAlert::new(
                                Severity::Medium,
                                ALERT_SOURCE,
                                format!("Subsystem '{}' unavailable: {}", step.name(), failure),
                            ));
                        }
                        Criticality::Critical => {
                            error!(
                                step = step.name(),
                                error = %failure,
                                "[Bootstrap] Critical step failed, aborting startup"
                            );
                            self.alerts.publish(SecurityAlert::new(
                                Severity::Critical,
                                ALERT_SOURCE,
                                format!("Startup aborted by '{}': {}", step.name(), failure),
                            ));

                            report.aborted = true;
                            report.duration = timer.elapsed();
                            BOOTSTRAP_ABORTS.inc();

                            return Err(BootstrapError::CriticalStepFailed {
                                step: step.name().to_string(),
                                source: failure,
                                report: Box::new(report),
                            });
                        }
                    }
                }
            }
        }

        report.duration = timer.elapsed();
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "[Bootstrap] Complete"
        );
        Ok(report)
    }
}

/// Run one step's action, turning a panic into a failure of that step.
async fn execute(step: &InitStep) -> Result<(), SubsystemFailure> {
    let action = step.action();
    match tokio::spawn(async move { action.run().await }.in_current_span()).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            let payload = join_error.into_panic();
            Err(SubsystemFailure::panicked(panic_message(payload.as_ref())))
        }
        Err(join_error) => Err(SubsystemFailure::initialization(join_error.to_string())),
    }
}

/// Run the registry with a default sequencer.
pub async fn run_bootstrap(registry: &SubsystemRegistry) -> Result<BootstrapReport, BootstrapError> {
    BootstrapSequencer::new().run(registry).await
}
