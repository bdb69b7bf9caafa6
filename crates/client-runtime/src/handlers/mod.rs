//! # Alert Handlers
//!
//! Sinks subscribed to the alert router by the `alert-sinks` step.

pub mod log_sink;
pub mod metrics_sink;
pub mod notification;

pub use log_sink::LogSink;
pub use metrics_sink::MetricsSink;
pub use notification::{Notice, NotificationCenter, DEFAULT_NOTICE_CAPACITY};
