//! Alert sink counting alerts per severity.

use shared_bus::{AlertHandler, RoutedAlert};
use shared_types::HandlerFailure;
use vigil_telemetry::ALERTS_PUBLISHED;

#[derive(Debug, Default)]
pub struct MetricsSink;

impl AlertHandler for MetricsSink {
    fn handle(&self, routed: &RoutedAlert) -> Result<(), HandlerFailure> {
        ALERTS_PUBLISHED
            .with_label_values(&[routed.severity().as_str()])
            .inc();
        Ok(())
    }

    fn name(&self) -> &str {
        "metrics-sink"
    }
}
