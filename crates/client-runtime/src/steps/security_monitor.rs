//! # `security-monitor` (OPTIONAL)
//!
//! Runs the environment integrity probes once during bootstrap, publishes
//! what they find, then schedules a periodic re-check and returns.

use async_trait::async_trait;
use shared_bus::AlertPublisher;
use shared_types::{InitAction, SecurityAlert, Severity, SubsystemFailure};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::wiring::{shutdown_signalled, BackgroundTasks};

pub const STEP_NAME: &str = "security-monitor";
const JOB_NAME: &str = "security-monitor";

/// Something a probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// An environment integrity check.
pub trait IntegrityProbe: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self) -> Vec<Finding>;
}

/// Flags environment variables used to inject code into the process.
pub struct InjectionProbe {
    variables: Vec<(String, Option<String>)>,
}

/// Variables that preload foreign code into the client.
pub const INJECTION_VARIABLES: &[&str] = &["LD_PRELOAD", "DYLD_INSERT_LIBRARIES"];

impl InjectionProbe {
    /// Probe over the current process environment.
    pub fn from_env() -> Self {
        Self::with_values(
            INJECTION_VARIABLES
                .iter()
                .map(|name| (name.to_string(), std::env::var(name).ok()))
                .collect(),
        )
    }

    pub fn with_values(variables: Vec<(String, Option<String>)>) -> Self {
        Self { variables }
    }
}

impl IntegrityProbe for InjectionProbe {
    fn name(&self) -> &str {
        "library-injection"
    }

    fn check(&self) -> Vec<Finding> {
        self.variables
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|_| Finding::new(Severity::Critical, format!("{name} is set; foreign code may be loaded")))
            })
            .collect()
    }
}

/// Flags a data directory other local users can write to.
pub struct DataDirProbe {
    data_dir: PathBuf,
}

impl DataDirProbe {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl IntegrityProbe for DataDirProbe {
    fn name(&self) -> &str {
        "data-dir-permissions"
    }

    #[cfg(unix)]
    fn check(&self) -> Vec<Finding> {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(&self.data_dir) {
            Ok(meta) if meta.permissions().mode() & 0o002 != 0 => vec![Finding::new(
                Severity::High,
                format!("{} is world-writable", self.data_dir.display()),
            )],
            Ok(_) => Vec::new(),
            Err(e) => vec![Finding::new(
                Severity::Medium,
                format!("cannot inspect {}: {e}", self.data_dir.display()),
            )],
        }
    }

    #[cfg(not(unix))]
    fn check(&self) -> Vec<Finding> {
        Vec::new()
    }
}

/// Notes that the client is running a debug build.
pub struct DebugBuildProbe {
    debug_build: bool,
}

impl DebugBuildProbe {
    pub fn new() -> Self {
        Self {
            debug_build: cfg!(debug_assertions),
        }
    }
}

impl Default for DebugBuildProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityProbe for DebugBuildProbe {
    fn name(&self) -> &str {
        "debug-build"
    }

    fn check(&self) -> Vec<Finding> {
        if self.debug_build {
            vec![Finding::new(Severity::Low, "running a debug build")]
        } else {
            Vec::new()
        }
    }
}

/// Run every probe and publish the findings. Returns the number published.
pub fn sweep(probes: &[Arc<dyn IntegrityProbe>], alerts: &dyn AlertPublisher) -> usize {
    let mut published = 0;
    for probe in probes {
        for finding in probe.check() {
            warn!(probe = probe.name(), severity = %finding.severity, "[SecurityMonitor] {}", finding.message);
            alerts.publish(SecurityAlert::new(finding.severity, STEP_NAME, finding.message));
            published += 1;
        }
    }
    published
}

pub struct SecurityMonitorStep {
    probes: Arc<Vec<Arc<dyn IntegrityProbe>>>,
    alerts: Arc<dyn AlertPublisher>,
    interval: Duration,
    tasks: Arc<BackgroundTasks>,
    shutdown: watch::Receiver<bool>,
}

impl SecurityMonitorStep {
    pub fn new(
        probes: Vec<Arc<dyn IntegrityProbe>>,
        alerts: Arc<dyn AlertPublisher>,
        interval: Duration,
        tasks: Arc<BackgroundTasks>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            probes: Arc::new(probes),
            alerts,
            interval,
            tasks,
            shutdown,
        }
    }
}

#[async_trait]
impl InitAction for SecurityMonitorStep {
    async fn run(&self) -> Result<(), SubsystemFailure> {
        if self.probes.is_empty() {
            return Err(SubsystemFailure::misconfigured("no integrity probes configured"));
        }

        let findings = sweep(&self.probes, self.alerts.as_ref());
        info!(probes = self.probes.len(), findings, "[SecurityMonitor] Initial sweep complete");

        let probes = Arc::clone(&self.probes);
        let alerts = Arc::clone(&self.alerts);
        let period = self.interval;
        let mut shutdown = self.shutdown.clone();

        self.tasks.spawn(JOB_NAME, async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; the initial sweep already ran.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_signalled(&mut shutdown) => {
                        debug!("[SecurityMonitor] Shutdown signal received");
                        break;
                    }
                    _ = ticker.tick() => {
                        sweep(&probes, alerts.as_ref());
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::AlertRouter;

    struct Fixed(Vec<Finding>);

    impl IntegrityProbe for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn check(&self) -> Vec<Finding> {
            self.0.clone()
        }
    }

    #[test]
    fn test_injection_probe() {
        let probe = InjectionProbe::with_values(vec![
            ("LD_PRELOAD".into(), Some("/tmp/evil.so".into())),
            ("DYLD_INSERT_LIBRARIES".into(), Some("  ".into())),
        ]);
        let findings = probe.check();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_debug_build_probe() {
        assert_eq!(DebugBuildProbe { debug_build: true }.check().len(), 1);
        assert!(DebugBuildProbe { debug_build: false }.check().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_data_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o777)).unwrap();
        let findings = DataDirProbe::new(dir.path()).check();
        assert_eq!(findings[0].severity, Severity::High);

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o700)).unwrap();
        assert!(DataDirProbe::new(dir.path()).check().is_empty());
    }

    #[tokio::test]
    async fn test_step_publishes_and_schedules() {
        let router = Arc::new(AlertRouter::new());
        let (_, mut alerts) = router.subscribe_stream();
        let tasks = Arc::new(BackgroundTasks::new());
        let (tx, rx) = watch::channel(false);

        let step = SecurityMonitorStep::new(
            vec![Arc::new(Fixed(vec![Finding::new(Severity::High, "rooted device")]))],
            router.clone(),
            Duration::from_secs(3600),
            tasks.clone(),
            rx,
        );

        step.run().await.unwrap();

        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.severity(), Severity::High);
        assert_eq!(alert.alert.source(), STEP_NAME);
        assert!(tasks.is_running(JOB_NAME));

        tx.send(true).unwrap();
        tasks.join_all(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_no_probes_is_a_failure() {
        let (_tx, rx) = watch::channel(false);
        let step = SecurityMonitorStep::new(
            Vec::new(),
            Arc::new(shared_bus::NoOpPublisher),
            Duration::from_secs(1),
            Arc::new(BackgroundTasks::new()),
            rx,
        );
        assert!(step.run().await.is_err());
    }
}
