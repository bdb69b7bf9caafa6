//! # Core Domain Entities
//!
//! Defines the entities that flow between the client subsystems.
//!
//! ## Clusters
//!
//! - **Alerting**: `Severity`, `SecurityAlert`
//! - **Identity**: `IdentityState`, `SessionToken`, `DeviceFingerprint`, `Session`
//! - **Contacts**: `Contact`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: ALERTING
// =============================================================================

/// Ordinal severity tier of a security alert.
///
/// Ordering is significant: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational finding.
    Low,
    /// Noteworthy finding, no user interaction needed.
    Medium,
    /// Surfaced prominently.
    High,
    /// Requires the most urgent handler path.
    Critical,
}

impl Severity {
    /// All tiers in ascending order.
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Lowercase label used in logs and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A security-relevant event raised by any subsystem.
///
/// Alerts are immutable once created and are broadcast to every handler
/// registered at publication time. There is no acknowledgment tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlert {
    severity: Severity,
    source: String,
    message: String,
    timestamp: DateTime<Utc>,
}

impl SecurityAlert {
    /// Create an alert stamped with the current time.
    pub fn new(severity: Severity, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(severity, source, message, Utc::now())
    }

    /// Create an alert with an explicit timestamp.
    pub fn at(
        severity: Severity,
        source: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            severity,
            source: source.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Name of the subsystem that raised the alert.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for SecurityAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)
    }
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// Opaque token of an authenticated session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; never print them in full.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "SessionToken({}…)", prefix)
    }
}

/// Deterministic identifier derived from stable device attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self(fingerprint.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(12).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: SessionToken, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Whether the session is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Resolved identity of the user on this device.
///
/// Transitions only move forward:
///
/// ```text
/// Unresolved ──► Anonymous(fp) ──(explicit login)──► Authenticated(token)
///      └────────────────────────────────────────────►
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityState {
    /// A non-expired authenticated session exists.
    Authenticated(SessionToken),
    /// Identity bound to the device fingerprint.
    Anonymous(DeviceFingerprint),
    /// Every layer of the fallback chain failed.
    Unresolved,
}

impl IdentityState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Whether moving from `self` to `next` respects forward-only ordering.
    ///
    /// Anonymous identities may only be replaced by the same fingerprint or
    /// by an authenticated session; authenticated identities may only be
    /// replaced by another (refreshed) session.
    pub fn can_transition_to(&self, next: &IdentityState) -> bool {
        match (self, next) {
            (Self::Unresolved, _) => true,
            (Self::Anonymous(current), Self::Anonymous(candidate)) => current == candidate,
            (Self::Anonymous(_), Self::Authenticated(_)) => true,
            (Self::Authenticated(_), Self::Authenticated(_)) => true,
            _ => false,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous(_) => "anonymous",
            Self::Unresolved => "unresolved",
        }
    }
}

// =============================================================================
// CLUSTER C: CONTACTS
// =============================================================================

/// A sanitized contact record.
///
/// `normalized_phone` contains only ASCII digits with an optional leading
/// `+` and at least one digit. Construct through [`Contact::new`], which
/// enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    name: String,
    normalized_phone: String,
}

impl Contact {
    /// Build a contact from an already-normalized phone number.
    ///
    /// Returns `None` if the name is blank or the phone violates the
    /// normalized form.
    pub fn new(name: impl Into<String>, normalized_phone: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let normalized_phone = normalized_phone.into();
        if name.trim().is_empty() || !is_normalized_phone(&normalized_phone) {
            return None;
        }
        Some(Self {
            name,
            normalized_phone,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_phone(&self) -> &str {
        &self.normalized_phone
    }
}

/// Check the normalized phone form: optional leading `+`, then one or more digits.
pub fn is_normalized_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
