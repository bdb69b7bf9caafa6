//! Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod backend;
pub mod clock;
pub mod device;
pub mod file;
pub mod memory;

pub use backend::{LocalIdentityBackend, NoOpMerge, ScriptedBackend};
pub use clock::{FixedClock, SystemClock};
pub use device::{StaticDeviceAttributes, UnavailableDeviceAttributes};
pub use file::{
    FileBindingStore, FileFailureLedger, FileSessionStore, JsonFile, BINDING_FILE, FAILURES_FILE,
    SESSION_FILE,
};
pub use memory::{InMemoryBindingStore, InMemoryFailureLedger, InMemorySessionStore};
