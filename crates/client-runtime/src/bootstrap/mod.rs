//! # Bootstrap
//!
//! Executes the frozen [`SubsystemRegistry`](shared_types::SubsystemRegistry)
//! and produces a [`BootstrapReport`].

mod report;
mod sequencer;

pub use report::BootstrapReport;
pub use sequencer::{run_bootstrap, BootstrapError, BootstrapSequencer};
