//! In-memory contact source

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{ContactError, RawContact};
use crate::ports::ContactSource;

/// Contact source backed by a vector, for tests and previews.
#[derive(Default)]
pub struct InMemoryContactSource {
    records: RwLock<Vec<RawContact>>,
    denied: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryContactSource {
    pub fn new(records: Vec<RawContact>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    pub fn push(&self, record: RawContact) {
        self.records.write().push(record);
    }

    /// Make every following read fail as if the user revoked access.
    pub fn deny_access(&self) {
        self.denied.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactSource for InMemoryContactSource {
    async fn read_contacts(&self) -> Result<Vec<RawContact>, ContactError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(ContactError::PermissionDenied);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().clone())
    }
}
