//! Alert sink writing every alert to the log.

use shared_bus::{AlertHandler, Escalation, RoutedAlert};
use shared_types::HandlerFailure;
use vigil_telemetry::log_alert;

/// Logs alerts at a level matching their escalation.
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertHandler for LogSink {
    fn handle(&self, routed: &RoutedAlert) -> Result<(), HandlerFailure> {
        let alert = &routed.alert;
        match routed.escalation {
            Escalation::Informational => log_alert!(info, alert, escalation = %routed.escalation),
            Escalation::Prominent => log_alert!(warn, alert, escalation = %routed.escalation),
            Escalation::Interactive => log_alert!(error, alert, escalation = %routed.escalation),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log-sink"
    }
}
