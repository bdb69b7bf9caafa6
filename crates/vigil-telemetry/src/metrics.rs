//! Prometheus metrics for the Vigil client.
//!
//! All metrics follow the naming convention: `vigil_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., bootstrap_steps_total)
//! - **Histogram**: Distribution of values (e.g., bootstrap_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // BOOTSTRAP METRICS
    // =========================================================================

    /// Init steps executed, by step name and outcome
    pub static ref BOOTSTRAP_STEPS: IntCounterVec = IntCounterVec::new(
        Opts::new("vigil_bootstrap_steps_total", "Init steps executed during bootstrap"),
        &["step", "outcome"]  // outcome: succeeded/failed
    ).expect("metric creation failed");

    /// Bootstrap runs aborted by a CRITICAL step
    pub static ref BOOTSTRAP_ABORTS: IntCounter = IntCounter::new(
        "vigil_bootstrap_aborts_total",
        "Bootstrap runs aborted by a critical step failure"
    ).expect("metric creation failed");

    /// Wall time of a bootstrap run
    pub static ref BOOTSTRAP_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "vigil_bootstrap_duration_seconds",
            "Time spent running the bootstrap sequence"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // ALERT METRICS
    // =========================================================================

    /// Alerts observed by the metrics sink, by severity
    pub static ref ALERTS_PUBLISHED: IntCounterVec = IntCounterVec::new(
        Opts::new("vigil_alerts_published_total", "Security alerts published"),
        &["severity"]
    ).expect("metric creation failed");

    // =========================================================================
    // IDENTITY METRICS
    // =========================================================================

    /// Identity resolutions by outcome
    pub static ref IDENTITY_RESOLUTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("vigil_identity_resolutions_total", "Identity resolutions by outcome"),
        &["outcome"]  // outcome: authenticated/anonymous/unresolved
    ).expect("metric creation failed");

    // =========================================================================
    // CONTACT METRICS
    // =========================================================================

    /// Contacts materialized after normalization
    pub static ref CONTACTS_LOADED: IntCounter = IntCounter::new(
        "vigil_contacts_loaded_total",
        "Contacts materialized after normalization"
    ).expect("metric creation failed");
}

/// Handle to the registered metrics
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered metrics are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Bootstrap
        Box::new(BOOTSTRAP_STEPS.clone()),
        Box::new(BOOTSTRAP_ABORTS.clone()),
        Box::new(BOOTSTRAP_DURATION.clone()),
        // Alerts
        Box::new(ALERTS_PUBLISHED.clone()),
        // Identity
        Box::new(IDENTITY_RESOLUTIONS.clone()),
        // Contacts
        Box::new(CONTACTS_LOADED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }

    /// Time since the timer started; the observation itself waits for drop.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
