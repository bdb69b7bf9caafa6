//! # Vigil Telemetry
//!
//! Observability for the Vigil client.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms for bootstrap, alerts,
//!   identity resolution and contacts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vigil_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `vigil-client` | Service name in logs |
//! | `VIGIL_LOG_LEVEL` | `info` | Log level filter |
//! | `VIGIL_JSON_LOGS` | `false` (`true` under CI) | JSON log output |
//! | `VIGIL_CONSOLE_OUTPUT` | `true` | Console output |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, ALERTS_PUBLISHED,
    BOOTSTRAP_ABORTS, BOOTSTRAP_DURATION, BOOTSTRAP_STEPS, CONTACTS_LOADED, IDENTITY_RESOLUTIONS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so early log lines can already be counted
    let metrics_handle = register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use vigil_telemetry::subsystem_span;
///
/// fn warm_cache() {
///     let _span = subsystem_span!("warm_cache", subsystem = "cache", capacity = 256);
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
