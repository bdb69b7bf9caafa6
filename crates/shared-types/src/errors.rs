//! # Error Types
//!
//! Defines the error taxonomy shared across the client crates.
//!
//! | Error | Raised when | Fatal |
//! |-------|-------------|-------|
//! | `ConfigurationError` | registry or client config is malformed | yes, at build time |
//! | `SubsystemFailure` | an init step fails | only if the step is CRITICAL |
//! | `IdentityResolutionFailure` | every identity fallback layer failed | no |
//! | `HandlerFailure` | an alert handler failed | no |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Malformed registry or client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Two init steps share a name.
    #[error("Duplicate init step: {0}")]
    DuplicateStep(String),

    /// An init step was registered without a name.
    #[error("Init step name must not be empty")]
    EmptyStepName,

    /// A configuration value is out of range or missing.
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigurationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Categories of init step failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The step could not bring its subsystem up.
    InitializationFailed,
    /// A collaborator the step needs is unavailable.
    NotAvailable,
    /// The step's configuration is unusable.
    Misconfigured,
    /// The step panicked; caught at the sequencer boundary.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed => write!(f, "InitializationFailed"),
            Self::NotAvailable => write!(f, "NotAvailable"),
            Self::Misconfigured => write!(f, "Misconfigured"),
            Self::Panicked => write!(f, "Panicked"),
        }
    }
}

/// Failure of a single init step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SubsystemFailure {
    /// Error kind.
    pub kind: FailureKind,
    /// Human-readable error message.
    pub message: String,
}

impl SubsystemFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InitializationFailed, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotAvailable, message)
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Misconfigured, message)
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Panicked, message)
    }
}

/// Every layer of the identity fallback chain failed.
///
/// Never escapes `resolve()`; it is logged and turned into an
/// `Unresolved` state plus an alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityResolutionFailure {
    #[error("Device attributes unavailable: {0}")]
    AttributesUnavailable(String),

    #[error("Backend rejected device binding: {0}")]
    BackendRejected(String),

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Identity store error: {0}")]
    Store(String),

    #[error("Session expired and re-authentication is required")]
    ReauthenticationRequired,
}

/// A subscribed alert handler failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Alert handler failed: {0}")]
pub struct HandlerFailure(pub String);

impl HandlerFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_failure_display() {
        let err = SubsystemFailure::initialization("keystore locked");
        let display = err.to_string();
        assert!(display.contains("InitializationFailed"));
        assert!(display.contains("keystore locked"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::DuplicateStep("cache".into());
        assert_eq!(err.to_string(), "Duplicate init step: cache");

        let err = ConfigurationError::invalid("cache.capacity", "must be positive");
        assert!(err.to_string().contains("cache.capacity"));
    }
}
