//! Outbound Ports (Driven Ports)

use async_trait::async_trait;

use crate::domain::{ContactError, RawContact};

/// Platform contact store (Driven Port)
///
/// Records are returned in the store's declared sort order, typically
/// name-ascending. The normalizer preserves that order.
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn read_contacts(&self) -> Result<Vec<RawContact>, ContactError>;
}

#[async_trait]
impl<T: ContactSource + ?Sized> ContactSource for std::sync::Arc<T> {
    async fn read_contacts(&self) -> Result<Vec<RawContact>, ContactError> {
        (**self).read_contacts().await
    }
}
