//! Export file envelope.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// File written by "export profiles" and read back by import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    /// Format version.
    pub version: u32,
    /// Exported profiles.
    pub profiles: Vec<Profile>,
    /// Export time, epoch milliseconds.
    pub exported_at: i64,
}

impl ExportFile {
    /// Wraps profiles in a versioned envelope.
    #[must_use]
    pub const fn new(profiles: Vec<Profile>, exported_at: i64) -> Self {
        Self {
            version: EXPORT_VERSION,
            profiles,
            exported_at,
        }
    }
}
