//! # Init Steps
//!
//! The actions behind the client's registry, in registration order:
//!
//! | Step | Criticality |
//! |------|-------------|
//! | `security-config` | CRITICAL |
//! | `alert-sinks` | OPTIONAL |
//! | `cache` | OPTIONAL |
//! | `security-monitor` | OPTIONAL |
//! | `scheduler` | OPTIONAL |

pub mod alert_sinks;
pub mod cache;
pub mod scheduler;
pub mod security_config;
pub mod security_monitor;

pub use alert_sinks::{attach_alert_sinks, AlertSinksStep};
pub use cache::{CacheSlot, CacheStep, CachedResponse, ResponseCache};
pub use scheduler::SchedulerStep;
pub use security_config::SecurityConfigStep;
pub use security_monitor::{
    DataDirProbe, DebugBuildProbe, Finding, InjectionProbe, IntegrityProbe, SecurityMonitorStep,
};
