//! # Init Step Contract
//!
//! Defines the contract every subsystem implements to take part in client
//! startup.
//!
//! ## Design Philosophy
//!
//! - **Uniform isolation**: each step carries a `Criticality`; the sequencer
//!   applies one failure policy instead of per-subsystem try/catch blocks
//! - **Schedule, don't wait**: steps that start background work spawn it and
//!   return immediately
//! - **Step-owned idempotence**: the orchestrator never deduplicates across
//!   runs, so actions must tolerate being invoked again after a restart
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use shared_types::{Criticality, InitAction, InitStep, SubsystemFailure};
//! use async_trait::async_trait;
//!
//! struct WarmCache { /* ... */ }
//!
//! #[async_trait]
//! impl InitAction for WarmCache {
//!     async fn run(&self) -> Result<(), SubsystemFailure> { Ok(()) }
//! }
//!
//! let step = InitStep::new("cache", Criticality::Optional, WarmCache { /* ... */ });
//! ```

use crate::errors::SubsystemFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Whether a step's failure aborts the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criticality {
    /// Failure aborts startup.
    Critical,
    /// Failure is recorded and the subsystem runs degraded or absent.
    Optional,
}

impl Criticality {
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::Optional => write!(f, "OPTIONAL"),
        }
    }
}

/// The work an init step performs.
///
/// Called exactly once per bootstrap run. Implementations that launch
/// background work must return as soon as the work is scheduled.
#[async_trait]
pub trait InitAction: Send + Sync {
    async fn run(&self) -> Result<(), SubsystemFailure>;
}

/// Adapter turning a synchronous closure into an [`InitAction`].
pub struct FnAction<F>(F);

#[async_trait]
impl<F> InitAction for FnAction<F>
where
    F: Fn() -> Result<(), SubsystemFailure> + Send + Sync,
{
    async fn run(&self) -> Result<(), SubsystemFailure> {
        (self.0)()
    }
}

/// A named, classified initialization step.
///
/// Immutable once built; cloning shares the underlying action.
#[derive(Clone)]
pub struct InitStep {
    name: String,
    criticality: Criticality,
    action: Arc<dyn InitAction>,
}

impl InitStep {
    /// Create a step from any [`InitAction`].
    pub fn new(
        name: impl Into<String>,
        criticality: Criticality,
        action: impl InitAction + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            criticality,
            action: Arc::new(action),
        }
    }

    /// Create a step from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<String>, criticality: Criticality, f: F) -> Self
    where
        F: Fn() -> Result<(), SubsystemFailure> + Send + Sync + 'static,
    {
        Self::new(name, criticality, FnAction(f))
    }

    /// Shorthand for a CRITICAL step.
    pub fn critical(name: impl Into<String>, action: impl InitAction + 'static) -> Self {
        Self::new(name, Criticality::Critical, action)
    }

    /// Shorthand for an OPTIONAL step.
    pub fn optional(name: impl Into<String>, action: impl InitAction + 'static) -> Self {
        Self::new(name, Criticality::Optional, action)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    /// Handle to the step's action.
    pub fn action(&self) -> Arc<dyn InitAction> {
        Arc::clone(&self.action)
    }

    /// Run the step's action.
    pub async fn run(&self) -> Result<(), SubsystemFailure> {
        self.action.run().await
    }
}

impl fmt::Debug for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitStep")
            .field("name", &self.name)
            .field("criticality", &self.criticality)
            .finish_non_exhaustive()
    }
}
