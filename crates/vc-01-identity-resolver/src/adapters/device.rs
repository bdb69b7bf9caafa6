//! Device attribute sources

use crate::domain::DeviceAttributes;
use crate::error::AttributeError;
use crate::ports::DeviceAttributeSource;

/// Attributes supplied up front by the embedding platform layer.
pub struct StaticDeviceAttributes {
    attributes: DeviceAttributes,
}

impl StaticDeviceAttributes {
    pub fn new(attributes: DeviceAttributes) -> Self {
        Self { attributes }
    }
}

impl DeviceAttributeSource for StaticDeviceAttributes {
    fn attributes(&self) -> Result<DeviceAttributes, AttributeError> {
        Ok(self.attributes.clone())
    }
}

/// Source for platforms that expose no stable attributes.
pub struct UnavailableDeviceAttributes {
    reason: String,
}

impl UnavailableDeviceAttributes {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl DeviceAttributeSource for UnavailableDeviceAttributes {
    fn attributes(&self) -> Result<DeviceAttributes, AttributeError> {
        Err(AttributeError::Unavailable(self.reason.clone()))
    }
}
