//! # File-backed Identity Stores
//!
//! Sessions, bindings and the failure ledger are stored as one JSON document
//! per file.
//!
//! ## Crash Safety
//!
//! Writes go to `<file>.tmp`, are synced, then renamed over the target. A
//! shutdown at any point leaves either the previous or the new document on
//! disk, never a torn one. A sidecar `<file>.lock` held with `fs2` keeps a
//! second client process from interleaving writes.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::Session;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::AnonymousBinding;
use crate::error::StoreError;
use crate::ports::{BindingStore, FailureLedger, SessionStore};

/// Session file name inside the data directory
pub const SESSION_FILE: &str = "session.json";
/// Binding file name inside the data directory
pub const BINDING_FILE: &str = "device-binding.json";
/// Failure ledger file name inside the data directory
pub const FAILURES_FILE: &str = "identity-failures.json";

/// One JSON document on disk.
pub struct JsonFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    pub fn read(&self) -> Result<Option<T>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
    }

    pub fn write(&self, record: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let _lock = self.lock()?;

        let bytes = serde_json::to_vec_pretty(record).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "[IdentityStore] Record written");
        Ok(())
    }

    pub fn remove(&self) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Exclusive lock on the sidecar file, released when the handle drops.
    fn lock(&self) -> Result<File, StoreError> {
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| self.io_error(e))?;
        file.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(lock_path.display().to_string()))?;
        Ok(file)
    }
}

/// Session store persisted under the client data directory.
pub struct FileSessionStore {
    file: JsonFile<Session>,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        self.file.read()
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.file.write(session)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.file.remove()
    }
}

/// Device binding store persisted under the client data directory.
pub struct FileBindingStore {
    file: JsonFile<AnonymousBinding>,
}

impl FileBindingStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(BINDING_FILE))
    }
}

impl BindingStore for FileBindingStore {
    fn load(&self) -> Result<Option<AnonymousBinding>, StoreError> {
        self.file.read()
    }

    fn save(&self, binding: &AnonymousBinding) -> Result<(), StoreError> {
        self.file.write(binding)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FailureRecord {
    consecutive_failures: u32,
}

/// Failure ledger persisted under the client data directory.
///
/// A missing file reads as zero failures.
pub struct FileFailureLedger {
    file: JsonFile<FailureRecord>,
}

impl FileFailureLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(FAILURES_FILE))
    }
}

impl FailureLedger for FileFailureLedger {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self
            .file
            .read()?
            .map(|record| record.consecutive_failures)
            .unwrap_or(0))
    }

    fn save(&self, consecutive_failures: u32) -> Result<(), StoreError> {
        // Nothing on disk means zero.
        if consecutive_failures == 0 {
            if !self.file.path().exists() {
                return Ok(());
            }
            return self.file.remove();
        }
        self.file.write(&FailureRecord {
            consecutive_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared_types::{DeviceFingerprint, SessionToken};
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(
            SessionToken::new("tok-file"),
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_session_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        FileSessionStore::in_dir(dir.path()).save(&session()).unwrap();

        let reopened = FileSessionStore::in_dir(dir.path());
        assert_eq!(reopened.load().unwrap(), Some(session()));
        assert!(!dir.path().join("session.tmp").exists());
    }

    #[test]
    fn test_clear_removes_session() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store.save(&session()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_binding_round_trip_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileBindingStore::in_dir(dir.path().join("nested/data"));
        let binding = AnonymousBinding::new(
            DeviceFingerprint::new("ab".repeat(32)),
            "anon-7",
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );

        store.save(&binding).unwrap();
        assert_eq!(store.load().unwrap(), Some(binding));
    }

    #[test]
    fn test_torn_file_reports_corruption() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), b"{\"token\": \"tok").unwrap();

        let store = FileSessionStore::in_dir(dir.path());
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_leftover_temp_file_does_not_shadow_record() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store.save(&session()).unwrap();

        // Simulates a shutdown between temp write and rename.
        std::fs::write(dir.path().join("session.tmp"), b"partial").unwrap();

        assert_eq!(store.load().unwrap(), Some(session()));
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));
    }

    #[test]
    fn test_failure_ledger_survives_reopen() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileFailureLedger::in_dir(dir.path()).load().unwrap(), 0);

        FileFailureLedger::in_dir(dir.path()).save(3).unwrap();
        let reopened = FileFailureLedger::in_dir(dir.path());
        assert_eq!(reopened.load().unwrap(), 3);

        reopened.save(0).unwrap();
        assert_eq!(FileFailureLedger::in_dir(dir.path()).load().unwrap(), 0);
        assert!(!dir.path().join(FAILURES_FILE).exists());
    }

    #[test]
    fn test_failure_ledger_reset_on_clean_device_writes_nothing() {
        let dir = TempDir::new().unwrap();
        FileFailureLedger::in_dir(dir.path()).save(0).unwrap();
        assert!(!dir.path().join(FAILURES_FILE).exists());
    }
}
