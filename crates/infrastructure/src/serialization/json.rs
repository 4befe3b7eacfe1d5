//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io;

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Serializes a value to deterministic JSON.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`] but returns bytes for direct file writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let json = to_json_stable(value)?;
    Ok(json.into_bytes())
}

/// Deserializes JSON from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openheaders_domain::{ExportFile, HeaderRule, Profile};

    fn export() -> ExportFile {
        let profile = Profile::new("Dev", "#ff0000", 5).with_header(HeaderRule::named("X-A", "1"));
        ExportFile::new(vec![profile], 10)
    }

    #[test]
    fn stable_output_has_trailing_newline_and_two_space_indent() {
        let json = to_json_stable(&export()).expect("serialization should work");
        assert!(json.ends_with("}\n"));
        assert!(json.contains("\n  \"version\": 1"));
    }

    #[test]
    fn output_is_identical_across_runs() {
        let file = export();
        let first = to_json_stable_bytes(&file).expect("serialization should work");
        let second = to_json_stable_bytes(&file).expect("serialization should work");
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrip_preserves_profiles() {
        let file = export();
        let json = to_json_stable(&file).expect("serialization should work");
        let restored: ExportFile = from_json(&json).expect("deserialization should work");
        assert_eq!(restored, file);
    }

    #[test]
    fn invalid_bytes_are_reported() {
        let result: Result<serde_json::Value, _> = from_json_bytes(b"{\"profiles\": }");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
