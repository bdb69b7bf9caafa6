//! # Runtime Wiring
//!
//! Background jobs, the sync collaborator and the deferred identity tasks.

pub mod deferred;
pub mod sync;
pub mod tasks;

pub use deferred::{follow_identity_changes, spawn_identity_task, DeferredOutcome, FOLLOW_JOB};
pub use sync::{LocalSyncService, SyncError, SyncService};
pub use tasks::{shutdown_signalled, BackgroundTasks};
