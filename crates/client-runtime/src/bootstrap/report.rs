//! Bootstrap report

use shared_types::SubsystemFailure;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Outcome of one bootstrap run.
///
/// Created fresh per run and handed to the caller; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootstrapReport {
    /// Steps whose action returned `Ok`.
    pub succeeded: BTreeSet<String>,
    /// Steps whose action failed, with the failure.
    pub failed: BTreeMap<String, SubsystemFailure>,
    /// Whether a CRITICAL step stopped the run.
    pub aborted: bool,
    /// Step names in the order they ran.
    pub executed: Vec<String>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&mut self, step: &str) {
        self.executed.push(step.to_string());
        self.succeeded.insert(step.to_string());
    }

    pub(crate) fn record_failure(&mut self, step: &str, failure: SubsystemFailure) {
        self.executed.push(step.to_string());
        self.failed.insert(step.to_string(), failure);
    }

    pub fn has_succeeded(&self, step: &str) -> bool {
        self.succeeded.contains(step)
    }

    pub fn failure(&self, step: &str) -> Option<&SubsystemFailure> {
        self.failed.get(step)
    }

    pub fn was_executed(&self, step: &str) -> bool {
        self.executed.iter().any(|s| s == step)
    }

    /// Completed, but with at least one OPTIONAL step missing.
    pub fn is_degraded(&self) -> bool {
        !self.aborted && !self.failed.is_empty()
    }
}
