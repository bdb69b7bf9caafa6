//! # Shared Bus - Security Alert Router
//!
//! Broadcasts `SecurityAlert`s raised by any subsystem to every registered
//! handler.
//!
//! ## Delivery Rules
//!
//! - **Broadcast, not queue:** every handler registered at publication time
//!   receives every alert exactly once
//! - **No retroactive delivery:** handlers registered after `publish`
//!   returns never see that alert
//! - **Per-handler FIFO:** a handler never sees alert B before alert A if A
//!   was published first
//! - **Isolation:** handler errors and panics stop at the router boundary
//!
//! ## Routing
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐   RoutedAlert   ┌───────────┐
//! │  Subsystem   │ ────────────► │ AlertRouter  │ ──────────────► │ Handler 1 │
//! └──────────────┘               │              │ ──────────────► │ Handler 2 │
//!                                │ RoutingPolicy│ ──────────────► │ Handler N │
//!                                └──────────────┘                 └───────────┘
//! ```
//!
//! The severity to escalation mapping lives in `RoutingPolicy` as data.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{Escalation, RoutedAlert, RoutingPolicy, DEFAULT_ROUTES};
pub use publisher::{AlertPublisher, AlertRouter, DeliveryMode, NoOpPublisher, RouterStats};
pub use subscriber::{
    panic_message, AlertHandler, AlertStream, ChannelHandler, FnHandler, SubscriptionId,
};
