//! Ports Layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::IdentityApi;
pub use outbound::{
    BindingStore, Clock, DeviceAttributeSource, FailureLedger, IdentityBackend, MergeCoordinator,
    SessionStore,
};
