//! Device attributes backed by a per-install identifier.
//!
//! The identifier is a random UUID written to the data directory the first
//! time it is needed and reused on every later launch, so the device
//! fingerprint stays stable across restarts.

use parking_lot::Mutex;
use std::path::Path;
use tracing::info;
use vc_01_identity_resolver::adapters::JsonFile;
use vc_01_identity_resolver::{AttributeError, DeviceAttributeSource, DeviceAttributes};

pub const INSTALL_ID_FILE: &str = "install-id.json";

pub struct InstallIdAttributes {
    file: JsonFile<String>,
    cached: Mutex<Option<String>>,
}

impl InstallIdAttributes {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            file: JsonFile::new(data_dir.as_ref().join(INSTALL_ID_FILE)),
            cached: Mutex::new(None),
        }
    }

    fn install_id(&self) -> Result<String, AttributeError> {
        let mut cached = self.cached.lock();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let unavailable = |e: vc_01_identity_resolver::StoreError| AttributeError::Unavailable(e.to_string());
        let id = match self.file.read().map_err(unavailable)? {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                self.file.write(&id).map_err(unavailable)?;
                info!(path = %self.file.path().display(), "[InstallId] New install id created");
                id
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }
}

impl DeviceAttributeSource for InstallIdAttributes {
    fn attributes(&self) -> Result<DeviceAttributes, AttributeError> {
        Ok(DeviceAttributes {
            install_id: self.install_id()?,
            hardware_id: String::new(),
            manufacturer: String::new(),
            model: std::env::consts::ARCH.to_string(),
            os_family: std::env::consts::OS.to_string(),
        })
    }
}
