//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while interpreting user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid, malformed, or not an http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A filter pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
