//! Contact export file source
//!
//! Reads a JSON array of `{"name": ..., "phone": ...}` objects, the format
//! the platform layer exports the address book in. Missing keys and `null`
//! values are both treated as absent.
//!
//! Exports can be large, so reading and parsing run on the blocking pool.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{ContactError, RawContact};
use crate::ports::ContactSource;

pub struct JsonContactSource {
    path: PathBuf,
}

impl JsonContactSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn read_export(path: &Path) -> Result<Vec<RawContact>, ContactError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        // No export yet means an empty address book.
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(ContactError::PermissionDenied)
        }
        Err(e) => return Err(ContactError::SourceUnavailable(e.to_string())),
    };

    serde_json::from_str(&text).map_err(|e| ContactError::MalformedExport {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl ContactSource for JsonContactSource {
    async fn read_contacts(&self) -> Result<Vec<RawContact>, ContactError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_export(&path))
            .await
            .map_err(|e| ContactError::SourceUnavailable(format!("export reader failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_export_with_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(
            &path,
            r#"[{"name": "Jane Doe", "phone": "(555) 123-4567"}, {"name": "No Phone"}, {"name": null, "phone": "1"}]"#,
        )
        .unwrap();

        let records = JsonContactSource::new(&path).read_contacts().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1], RawContact::new(Some("No Phone"), None));
        assert_eq!(records[2].name, None);
    }

    #[tokio::test]
    async fn test_missing_export_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = JsonContactSource::new(dir.path().join("absent.json"))
            .read_contacts()
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_export_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            JsonContactSource::new(&path).read_contacts().await,
            Err(ContactError::MalformedExport { .. })
        ));
    }

    #[tokio::test]
    async fn test_large_export_is_read_in_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        let entries: Vec<String> = (0..5_000)
            .map(|i| format!(r#"{{"name":"Contact {i}","phone":"+1 555 {i:07}"}}"#))
            .collect();
        std::fs::write(&path, format!("[{}]", entries.join(","))).unwrap();

        let contacts = JsonContactSource::new(&path).read_contacts().await.unwrap();

        assert_eq!(contacts.len(), 5_000);
    }
}
