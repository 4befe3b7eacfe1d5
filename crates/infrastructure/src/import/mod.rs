//! Profile import
//!
//! Supports the export files this application writes and the foreign
//! profile-list format.

mod foreign;
mod importer;
mod warning;

pub use importer::{ImportConfig, ImportError, ImportFormat, ImportResult, ProfileImporter};
pub use warning::{ImportWarning, WarningSeverity};
