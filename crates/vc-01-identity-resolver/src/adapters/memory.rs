//! In-memory adapters for tests and ephemeral clients.

use parking_lot::RwLock;
use shared_types::Session;

use crate::domain::AnonymousBinding;
use crate::error::StoreError;
use crate::ports::{BindingStore, FailureLedger, SessionStore};

/// In-memory session store
#[derive(Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.read().clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.write() = None;
        Ok(())
    }
}

/// In-memory binding store
#[derive(Default)]
pub struct InMemoryBindingStore {
    binding: RwLock<Option<AnonymousBinding>>,
}

impl InMemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<AnonymousBinding> {
        self.binding.read().clone()
    }

    pub fn clear(&self) {
        *self.binding.write() = None;
    }
}

impl BindingStore for InMemoryBindingStore {
    fn load(&self) -> Result<Option<AnonymousBinding>, StoreError> {
        Ok(self.binding.read().clone())
    }

    fn save(&self, binding: &AnonymousBinding) -> Result<(), StoreError> {
        *self.binding.write() = Some(binding.clone());
        Ok(())
    }
}

/// In-memory failure ledger
#[derive(Default)]
pub struct InMemoryFailureLedger {
    consecutive_failures: RwLock<u32>,
}

impl InMemoryFailureLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailureLedger for InMemoryFailureLedger {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(*self.consecutive_failures.read())
    }

    fn save(&self, consecutive_failures: u32) -> Result<(), StoreError> {
        *self.consecutive_failures.write() = consecutive_failures;
        Ok(())
    }
}
