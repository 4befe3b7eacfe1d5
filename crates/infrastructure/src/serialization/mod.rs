//! Deterministic JSON serialization for stored state and export files.
//!
//! Output is stable so repeated exports of the same profiles diff cleanly:
//! - Struct fields in declaration order
//! - 2-space indentation
//! - Trailing newline
//! - UTF-8 encoding without BOM

mod json;

pub use json::*;
