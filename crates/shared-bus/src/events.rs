//! # Alert Routing Policy
//!
//! Maps each severity tier to an escalation path. The mapping is data, not
//! branching inside the router: handlers read `RoutedAlert::escalation` and
//! pick their own behavior.
//!
//! | Severity | Escalation |
//! |----------|------------|
//! | `Critical` | `Interactive` (user-facing notification / escalation) |
//! | `High` | `Prominent` (surfaced, not interactive) |
//! | `Medium`, `Low` | `Informational` |

use serde::{Deserialize, Serialize};
use shared_types::{SecurityAlert, Severity};
use std::collections::BTreeMap;
use std::fmt;

/// How urgently an alert must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Escalation {
    /// Logged or recorded only.
    Informational,
    /// Surfaced prominently, no interaction required.
    Prominent,
    /// Requires the most urgent, user-facing path.
    Interactive,
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Informational => write!(f, "informational"),
            Self::Prominent => write!(f, "prominent"),
            Self::Interactive => write!(f, "interactive"),
        }
    }
}

/// Severity to escalation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    routes: BTreeMap<Severity, Escalation>,
}

/// Routes used by [`RoutingPolicy::default`].
pub const DEFAULT_ROUTES: [(Severity, Escalation); 4] = [
    (Severity::Low, Escalation::Informational),
    (Severity::Medium, Escalation::Informational),
    (Severity::High, Escalation::Prominent),
    (Severity::Critical, Escalation::Interactive),
];

impl RoutingPolicy {
    /// Build a policy from explicit routes.
    ///
    /// Severities missing from `routes` fall back to `Informational`.
    pub fn from_routes(routes: impl IntoIterator<Item = (Severity, Escalation)>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    /// Escalation path for a severity.
    pub fn escalation_for(&self, severity: Severity) -> Escalation {
        self.routes
            .get(&severity)
            .copied()
            .unwrap_or(Escalation::Informational)
    }

    /// Pair an alert with its escalation path.
    pub fn route(&self, alert: SecurityAlert) -> RoutedAlert {
        let escalation = self.escalation_for(alert.severity());
        RoutedAlert { alert, escalation }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::from_routes(DEFAULT_ROUTES)
    }
}

/// An alert as delivered to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedAlert {
    pub alert: SecurityAlert,
    pub escalation: Escalation,
}

impl RoutedAlert {
    pub fn severity(&self) -> Severity {
        self.alert.severity()
    }

    pub fn requires_interaction(&self) -> bool {
        self.escalation == Escalation::Interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_table() {
        let policy = RoutingPolicy::default();
        assert_eq!(policy.escalation_for(Severity::Critical), Escalation::Interactive);
        assert_eq!(policy.escalation_for(Severity::High), Escalation::Prominent);
        assert_eq!(policy.escalation_for(Severity::Medium), Escalation::Informational);
        assert_eq!(policy.escalation_for(Severity::Low), Escalation::Informational);
    }

    #[test]
    fn test_escalation_is_monotonic_in_severity() {
        let policy = RoutingPolicy::default();
        let escalations: Vec<Escalation> = Severity::ALL
            .iter()
            .map(|s| policy.escalation_for(*s))
            .collect();
        assert!(escalations.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_custom_policy_missing_tier_is_informational() {
        let policy = RoutingPolicy::from_routes([(Severity::Critical, Escalation::Prominent)]);
        assert_eq!(policy.escalation_for(Severity::Critical), Escalation::Prominent);
        assert_eq!(policy.escalation_for(Severity::High), Escalation::Informational);
    }

    #[test]
    fn test_route_attaches_escalation() {
        let routed = RoutingPolicy::default().route(SecurityAlert::new(
            Severity::Critical,
            "security-monitor",
            "tampered binary",
        ));
        assert!(routed.requires_interaction());
        assert_eq!(routed.severity(), Severity::Critical);
    }
}
