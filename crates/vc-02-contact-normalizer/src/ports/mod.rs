//! Ports Layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::ContactApi;
pub use outbound::ContactSource;
