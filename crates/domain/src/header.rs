//! Header modification rules.

use serde::{Deserialize, Serialize};

use crate::id::{HEADER_PREFIX, generate_id};

/// Which side of the exchange a header rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderType {
    /// Outgoing request headers.
    #[default]
    Request,
    /// Incoming response headers.
    Response,
}

/// What a header rule does to the named header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOperation {
    /// Replace (or create) the header with the rule's value.
    #[default]
    Set,
    /// Drop the header. The rule's value is ignored.
    Remove,
    /// Append the rule's value to the header.
    Append,
}

impl HeaderOperation {
    /// Returns true when the operation carries a value.
    #[must_use]
    pub const fn uses_value(self) -> bool {
        !matches!(self, Self::Remove)
    }
}

/// A single header modification rule owned by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRule {
    /// Unique identifier.
    pub id: String,
    /// Whether the rule participates in rule building.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Header name.
    #[serde(default)]
    pub name: String,
    /// Header value (ignored for `remove`).
    #[serde(default)]
    pub value: String,
    /// Free-form user note.
    #[serde(default)]
    pub comment: String,
    /// Request or response side.
    #[serde(rename = "type", default)]
    pub header_type: HeaderType,
    /// Operation applied to the header.
    #[serde(default)]
    pub operation: HeaderOperation,
}

const fn default_enabled() -> bool {
    true
}

impl HeaderRule {
    /// Creates an enabled, empty `set` request rule with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_id(HEADER_PREFIX),
            enabled: true,
            name: String::new(),
            value: String::new(),
            comment: String::new(),
            header_type: HeaderType::Request,
            operation: HeaderOperation::Set,
        }
    }

    /// Creates an enabled rule with the given name and value.
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::new()
        }
    }

    /// Sets the header type.
    #[must_use]
    pub const fn with_type(mut self, header_type: HeaderType) -> Self {
        self.header_type = header_type;
        self
    }

    /// Sets the operation.
    #[must_use]
    pub const fn with_operation(mut self, operation: HeaderOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Returns true when the rule is enabled and has a non-blank name.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.enabled && !self.name.trim().is_empty()
    }
}

impl Default for HeaderRule {
    fn default() -> Self {
        Self::new()
    }
}
