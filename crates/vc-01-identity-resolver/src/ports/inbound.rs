//! Inbound Ports (Driving Ports)
//!
//! The API the identity resolver exposes to the rest of the client.

use async_trait::async_trait;
use shared_types::{IdentityState, Session};
use tokio::sync::watch;

use crate::error::PromotionError;

/// Identity Resolver API (Driving Port)
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Run the fallback chain and return the resolved identity.
    ///
    /// Never fails: when every layer fails the result is
    /// `IdentityState::Unresolved` and an alert has been published.
    /// Calling it again on the same device yields the same identity.
    async fn resolve(&self) -> IdentityState;

    /// Promote to an authenticated identity after an explicit login.
    async fn promote(&self, session: Session) -> Result<IdentityState, PromotionError>;

    /// Last resolved identity.
    fn current(&self) -> IdentityState;

    /// Observe identity changes.
    fn watch(&self) -> watch::Receiver<IdentityState>;
}
