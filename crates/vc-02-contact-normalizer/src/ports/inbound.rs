//! Inbound Ports (Driving Ports)

use async_trait::async_trait;
use shared_types::Contact;

use crate::domain::ContactError;

/// Contact loading API used by UI collaborators (Driving Port)
#[async_trait]
pub trait ContactApi: Send + Sync {
    /// Read and sanitize every contact.
    ///
    /// Each call reads the store again; nothing is cached here.
    async fn load_contacts(&self) -> Result<Vec<Contact>, ContactError>;
}
