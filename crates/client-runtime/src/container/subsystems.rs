//! # Subsystem Container
//!
//! Holds all client subsystem instances and the registry that brings them up.
//!
//! ## Initialization Order
//!
//! ```text
//! security-config  (CRITICAL) pins, transport policy, data dir
//! alert-sinks      (OPTIONAL) confirms log / metrics / notification handlers
//! cache            (OPTIONAL) response cache
//! security-monitor (OPTIONAL) integrity probes + periodic re-check
//! scheduler        (OPTIONAL) recurring sync job
//! ```
//!
//! The alert sinks are attached while the container is built, so alerts
//! raised by any step (including a CRITICAL abort) reach them. Identity
//! resolution and sync initialization are not steps; the runtime starts them
//! after the bootstrap sequence returns.
//!
//! ## Thread Safety
//!
//! - Shared subsystems are held in `Arc`
//! - Steps receive clones of those handles, never the container itself

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument};

use shared_bus::{AlertRouter, RoutingPolicy, SubscriptionId};
use shared_types::{ConfigurationError, InitStep, SubsystemRegistry};
use vc_01_identity_resolver::adapters::{
    FileBindingStore, FileFailureLedger, FileSessionStore, LocalIdentityBackend, SystemClock,
};
use vc_01_identity_resolver::{IdentityDependencies, IdentityResolver};
use vc_02_contact_normalizer::{ContactNormalizer, ContactSource, JsonContactSource};

use crate::adapters::InstallIdAttributes;
use crate::container::config::ClientConfig;
use crate::handlers::NotificationCenter;
use crate::steps::{
    alert_sinks, attach_alert_sinks, cache, scheduler, security_config, security_monitor,
    AlertSinksStep, CacheSlot,
    CacheStep, DataDirProbe, DebugBuildProbe, InjectionProbe, IntegrityProbe, SchedulerStep,
    SecurityConfigStep, SecurityMonitorStep,
};
use crate::wiring::{BackgroundTasks, LocalSyncService};

/// Contact normalizer over whatever source the platform provides.
pub type ClientContacts = ContactNormalizer<Arc<dyn ContactSource>>;

/// Central container holding all client subsystem instances.
pub struct ClientContainer {
    /// Client configuration (immutable after construction).
    pub config: ClientConfig,

    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Security alert router. Every subsystem publishes here.
    pub alerts: Arc<AlertRouter>,

    /// Alert sink subscriptions, made when the container is built.
    pub alert_subscriptions: Arc<Mutex<Vec<SubscriptionId>>>,

    /// User-facing notices raised from alerts.
    pub notifications: Arc<NotificationCenter>,

    /// Long-running jobs scheduled by init steps.
    pub tasks: Arc<BackgroundTasks>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Identity fallback chain (vc-01).
    pub identity: Arc<IdentityResolver>,

    /// Address book normalization (vc-02).
    pub contacts: ClientContacts,

    /// Data sync bookkeeping. Also carries anonymous data over on login.
    pub sync: Arc<LocalSyncService>,

    /// Response cache, filled in by the `cache` step.
    pub cache: Arc<CacheSlot>,

    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ClientContainer {
    /// Create every subsystem. Nothing runs until the registry is executed.
    #[instrument(name = "client_container", skip(config))]
    pub fn new(config: ClientConfig) -> Self {
        info!(data_dir = %config.storage.data_dir.display(), "Initializing Vigil client container");

        // =====================================================================
        // PHASE 1: Shared Infrastructure
        // =====================================================================
        let alerts = Arc::new(AlertRouter::with_config(
            config.alerts.delivery,
            RoutingPolicy::default(),
        ));
        let notifications = Arc::new(NotificationCenter::new());
        let alert_subscriptions = Arc::new(Mutex::new(Vec::new()));
        attach_alert_sinks(&alerts, &notifications, &alert_subscriptions);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // =====================================================================
        // PHASE 2: Subsystems
        // =====================================================================
        let sync = Arc::new(LocalSyncService::new());
        let data_dir = &config.storage.data_dir;

        let identity = Arc::new(IdentityResolver::new(
            IdentityDependencies {
                sessions: Arc::new(FileSessionStore::in_dir(data_dir)),
                bindings: Arc::new(FileBindingStore::in_dir(data_dir)),
                attributes: Arc::new(InstallIdAttributes::in_dir(data_dir)),
                backend: Arc::new(LocalIdentityBackend),
                merger: sync.clone(),
                failures: Arc::new(FileFailureLedger::in_dir(data_dir)),
                clock: Arc::new(SystemClock),
            },
            alerts.clone(),
            config.identity.clone(),
        ));
        info!("  [vc-01] Identity resolver created");

        let source: Arc<dyn ContactSource> =
            Arc::new(JsonContactSource::new(config.storage.contacts_file()));
        let contacts = ContactNormalizer::new(source);
        info!("  [vc-02] Contact normalizer created");

        Self {
            config,
            alerts,
            alert_subscriptions,
            notifications,
            tasks: Arc::new(BackgroundTasks::new()),
            identity,
            contacts,
            sync,
            cache: Arc::new(CacheSlot::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Integrity probes the security monitor runs.
    fn integrity_probes(&self) -> Vec<Arc<dyn IntegrityProbe>> {
        vec![
            Arc::new(InjectionProbe::from_env()),
            Arc::new(DataDirProbe::new(&self.config.storage.data_dir)),
            Arc::new(DebugBuildProbe::new()),
        ]
    }

    /// Build the frozen init step table, in dependency order.
    pub fn build_registry(&self) -> Result<SubsystemRegistry, ConfigurationError> {
        SubsystemRegistry::from_steps([
            InitStep::critical(
                security_config::STEP_NAME,
                SecurityConfigStep::new(self.config.security.clone(), self.config.storage.clone()),
            ),
            InitStep::optional(
                alert_sinks::STEP_NAME,
                AlertSinksStep::new(
                    self.alerts.clone(),
                    self.notifications.clone(),
                    self.alert_subscriptions.clone(),
                ),
            ),
            InitStep::optional(
                cache::STEP_NAME,
                CacheStep::new(self.config.cache.capacity, self.cache.clone()),
            ),
            InitStep::optional(
                security_monitor::STEP_NAME,
                SecurityMonitorStep::new(
                    self.integrity_probes(),
                    self.alerts.clone(),
                    self.config.scheduler.monitor_interval(),
                    self.tasks.clone(),
                    self.shutdown_receiver(),
                ),
            ),
            InitStep::optional(
                scheduler::STEP_NAME,
                SchedulerStep::new(
                    self.sync.clone(),
                    self.config.scheduler.sync_interval(),
                    self.tasks.clone(),
                    self.shutdown_receiver(),
                ),
            ),
        ])
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Tell every background job to stop.
    pub fn signal_shutdown(&self) {
        // send_replace never fails, even with no receivers left
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}
