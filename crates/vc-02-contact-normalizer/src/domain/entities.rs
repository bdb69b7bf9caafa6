//! Contact entities

use serde::{Deserialize, Serialize};

/// A record as it comes out of the contact store, before sanitizing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl RawContact {
    pub fn new(name: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_owned),
            phone: phone.map(str::to_owned),
        }
    }
}

/// Outcome counts of one `load_contacts` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactStats {
    /// Records read from the store
    pub read: usize,
    /// Contacts produced
    pub loaded: usize,
    /// Dropped: missing or blank name
    pub missing_name: usize,
    /// Dropped: missing phone
    pub missing_phone: usize,
    /// Dropped: phone had no digits after normalization
    pub empty_phone: usize,
}

impl ContactStats {
    pub fn skipped(&self) -> usize {
        self.missing_name + self.missing_phone + self.empty_phone
    }
}
