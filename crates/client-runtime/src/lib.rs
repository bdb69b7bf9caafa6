//! # Vigil Client Runtime Library
//!
//! Startup core of the Vigil client. The `vigil-client` binary in `main.rs`
//! is a thin wrapper around [`ClientRuntime`].
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and the composition root
//! - `bootstrap/` - Runs the frozen init step table
//! - `steps/` - The init steps themselves
//! - `handlers/` - Alert sinks
//! - `adapters/` - Platform implementations of subsystem ports
//! - `wiring/` - Background jobs, sync and the deferred identity task
//!
//! ## Failure Policy
//!
//! A CRITICAL step failure aborts startup and leaves later steps unrun. An
//! OPTIONAL step failure is recorded in the [`BootstrapReport`], alerted,
//! and the client runs degraded.

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_lines)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod bootstrap;
pub mod container;
pub mod handlers;
pub mod runtime;
pub mod steps;
pub mod wiring;

pub use bootstrap::{run_bootstrap, BootstrapError, BootstrapReport, BootstrapSequencer};
pub use container::{ClientConfig, ClientContainer};
pub use runtime::{ClientRuntime, StartupError, SHUTDOWN_GRACE};
pub use wiring::DeferredOutcome;
