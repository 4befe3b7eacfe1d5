//! Export infrastructure.
//!
//! Profiles are exported as a versioned envelope rendered with the stable
//! JSON formatter, so exporting the same profiles twice yields identical
//! bytes.

use std::path::Path;

use openheaders_domain::ExportFile;
use thiserror::Error;

use crate::serialization::{SerializationError, to_json_stable};

/// Export error type.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    /// Nothing matched the requested profile ids.
    #[error("No profiles to export")]
    Empty,
    /// IO error while writing the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders an export file as stable, pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if the file holds no profiles or cannot be serialized.
pub fn export_json(file: &ExportFile) -> Result<String, ExportError> {
    if file.profiles.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(to_json_stable(file)?)
}

/// Writes an export file to `path`, creating parent directories.
///
/// # Errors
///
/// See [`export_json`]; also fails if the file cannot be written.
pub async fn write_export(path: &Path, file: &ExportFile) -> Result<(), ExportError> {
    let json = export_json(file)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), profiles = file.profiles.len(), "profiles exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use openheaders_domain::{HeaderRule, Profile};
    use pretty_assertions::assert_eq;

    fn file() -> ExportFile {
        ExportFile::new(
            vec![Profile::new("Dev", "#fff", 1).with_header(HeaderRule::named("X-A", "1"))],
            1_700_000_000_000,
        )
    }

    #[test]
    fn export_shape() {
        let json = export_json(&file()).expect("export should work");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["exportedAt"], 1_700_000_000_000_i64);
        assert_eq!(value["profiles"][0]["headers"][0]["name"], "X-A");
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn empty_export_is_rejected() {
        let empty = ExportFile::new(Vec::new(), 0);
        assert!(matches!(export_json(&empty), Err(ExportError::Empty)));
    }

    #[tokio::test]
    async fn writes_file_with_parent_dirs() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("out").join("profiles.json");
        write_export(&path, &file()).await.expect("write should work");

        let written = std::fs::read_to_string(&path).expect("file should exist");
        assert_eq!(written, export_json(&file()).expect("export should work"));
    }
}
