//! # Notification Center
//!
//! Collects alerts the user should see. Informational alerts are ignored;
//! prominent ones become passive notices and interactive ones become
//! notices the user must acknowledge.
//!
//! The UI layer drains the queue; the center never blocks the router.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared_bus::{AlertHandler, Escalation, RoutedAlert};
use shared_types::{HandlerFailure, Severity};
use std::collections::VecDeque;
use tracing::debug;

/// Notices kept before the oldest is dropped.
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    /// The user must dismiss this notice explicitly.
    pub requires_ack: bool,
}

/// Bounded queue of user-facing notices.
pub struct NotificationCenter {
    notices: Mutex<VecDeque<Notice>>,
    capacity: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTICE_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notices: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.lock().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.notices.lock().len()
    }

    /// Whether any pending notice needs acknowledgment.
    pub fn has_blocking_notice(&self) -> bool {
        self.notices.lock().iter().any(|n| n.requires_ack)
    }
}

impl AlertHandler for NotificationCenter {
    fn handle(&self, routed: &RoutedAlert) -> Result<(), HandlerFailure> {
        let requires_ack = match routed.escalation {
            Escalation::Informational => return Ok(()),
            Escalation::Prominent => false,
            Escalation::Interactive => true,
        };

        let notice = Notice {
            severity: routed.severity(),
            message: routed.alert.message().to_string(),
            raised_at: routed.alert.timestamp(),
            requires_ack,
        };

        let mut notices = self.notices.lock();
        if notices.len() == self.capacity {
            if let Some(dropped) = notices.pop_front() {
                debug!(severity = %dropped.severity, "[Notifications] Queue full, oldest notice dropped");
            }
        }
        notices.push_back(notice);
        Ok(())
    }

    fn name(&self) -> &str {
        "notification-center"
    }
}
