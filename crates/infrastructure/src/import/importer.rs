//! Profile Importer - Main Import Logic
//!
//! Accepts either an export file written by this application or a foreign
//! list of profiles. Every imported profile, header and filter gets a fresh
//! id. Malformed entries are skipped with a warning; the import fails only
//! when the top-level shape is unrecognised or nothing could be imported.

use std::path::Path;

use openheaders_application::{Clock, StatePersister, StateStore};
use openheaders_domain::Profile;
use serde_json::Value;
use thiserror::Error;

use super::foreign::{is_foreign_entry, map_foreign_profile};
use super::warning::ImportWarning;

/// Stand-in id for children that arrive without one.
const IMPORT_PLACEHOLDER_ID: &str = "imported";

/// Import configuration options
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Maximum file size in bytes (default: 10MB)
    pub max_file_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

/// Import error types
#[derive(Debug, Error)]
pub enum ImportError {
    /// File was not found at the specified path
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// File exceeds the maximum allowed size
    #[error("File too large: {size} bytes exceeds maximum of {max} bytes")]
    FileTooLarge {
        /// Actual file size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },
    /// JSON parsing failed
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    /// Neither a profile export nor a foreign profile list
    #[error("Invalid import format: {0}")]
    InvalidFormat(String),
    /// Every entry was malformed
    #[error("No valid profiles found")]
    NothingImported,
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Detected import format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// `{version, profiles, exportedAt}` written by export
    Native,
    /// List of `{title, headers}` entries
    Foreign,
    /// Unknown or unsupported format
    Unknown,
}

/// Result of a successful import
#[derive(Debug)]
pub struct ImportResult {
    /// Detected format
    pub format: ImportFormat,
    /// Profiles ready to be appended, with fresh ids
    pub profiles: Vec<Profile>,
    /// Entries skipped or adjusted along the way
    pub warnings: Vec<ImportWarning>,
}

/// Parses import payloads into profiles.
#[derive(Debug, Default)]
pub struct ProfileImporter {
    config: ImportConfig,
}

impl ProfileImporter {
    /// Create a new importer with default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new importer with custom config
    #[must_use]
    pub const fn with_config(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Detects which shape a payload has.
    #[must_use]
    pub fn detect_format(json: &Value) -> ImportFormat {
        match json {
            Value::Object(doc) if doc.get("profiles").is_some_and(Value::is_array) => {
                ImportFormat::Native
            }
            Value::Array(entries) if entries.iter().any(is_foreign_entry) => ImportFormat::Foreign,
            _ => ImportFormat::Unknown,
        }
    }

    /// Parses a payload.
    ///
    /// # Errors
    ///
    /// Returns an error for oversized or invalid JSON, an unrecognised shape,
    /// or when no entry could be imported.
    pub fn parse(&self, content: &str) -> Result<ImportResult, ImportError> {
        if content.len() > self.config.max_file_size {
            return Err(ImportError::FileTooLarge {
                size: content.len(),
                max: self.config.max_file_size,
            });
        }
        let json: Value =
            serde_json::from_str(content).map_err(|e| ImportError::InvalidJson(e.to_string()))?;

        let format = Self::detect_format(&json);
        let mut warnings = Vec::new();
        let profiles: Vec<Profile> = match (format, json) {
            (ImportFormat::Native, Value::Object(mut doc)) => {
                let entries = match doc.remove("profiles") {
                    Some(Value::Array(entries)) => entries,
                    _ => Vec::new(),
                };
                entries
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, entry)| map_native_profile(entry, i, &mut warnings))
                    .collect()
            }
            (ImportFormat::Foreign, Value::Array(entries)) => entries
                .into_iter()
                .enumerate()
                .filter_map(|(i, entry)| {
                    if is_foreign_entry(&entry) {
                        map_foreign_profile(entry, i, &mut warnings)
                    } else {
                        warnings.push(ImportWarning::skipped(
                            format!("[{i}]"),
                            "entry has no title and headers list",
                        ));
                        None
                    }
                })
                .collect(),
            _ => {
                return Err(ImportError::InvalidFormat(
                    "expected an export file or a list of profiles with title and headers"
                        .to_string(),
                ));
            }
        };

        if profiles.is_empty() {
            return Err(ImportError::NothingImported);
        }
        for warning in &warnings {
            tracing::warn!(%warning, "import entry skipped");
        }
        Ok(ImportResult {
            format,
            profiles,
            warnings,
        })
    }

    /// Reads and parses an import file.
    ///
    /// # Errors
    ///
    /// See [`ProfileImporter::parse`]; also fails if the file cannot be read.
    pub async fn parse_file(&self, path: &Path) -> Result<ImportResult, ImportError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::FileNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        self.parse(&content)
    }

    /// Parses `content` and appends the profiles to `store` as one undoable
    /// action. Returns false on any failure.
    pub fn import_into<P: StatePersister, C: Clock>(
        &self,
        store: &mut StateStore<P, C>,
        content: &str,
    ) -> bool {
        match self.parse(content) {
            Ok(result) => store.import_profiles(result.profiles),
            Err(error) => {
                tracing::warn!(%error, "import failed");
                false
            }
        }
    }
}

fn map_native_profile(
    entry: Value,
    index: usize,
    warnings: &mut Vec<ImportWarning>,
) -> Option<Profile> {
    let path = format!("profiles[{index}]");
    let has_identity = entry.get("id").is_some_and(Value::is_string)
        && entry.get("name").is_some_and(Value::is_string);
    if !has_identity {
        warnings.push(ImportWarning::skipped(path, "profile is missing id or name"));
        return None;
    }
    match serde_json::from_value::<Profile>(with_child_ids(entry)) {
        Ok(profile) => Some(profile.with_fresh_ids()),
        Err(e) => {
            warnings.push(ImportWarning::skipped(path, format!("malformed profile: {e}")));
            None
        }
    }
}

/// Gives id-less headers and filters a placeholder id so they decode.
///
/// Every child id is regenerated afterwards, so the placeholder never
/// reaches the store.
fn with_child_ids(mut entry: Value) -> Value {
    for field in ["headers", "urlFilters"] {
        let Some(children) = entry.get_mut(field).and_then(Value::as_array_mut) else {
            continue;
        };
        for child in children.iter_mut().filter_map(Value::as_object_mut) {
            if !child.get("id").is_some_and(Value::is_string) {
                child.insert("id".to_string(), Value::String(IMPORT_PLACEHOLDER_ID.to_string()));
            }
        }
    }
    entry
}
