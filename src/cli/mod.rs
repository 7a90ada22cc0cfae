//! CLI support for sift-lang
//!
//! Provides programmatic access to the `sift` commands so other tools can
//! embed them without shelling out.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{format_query, query_list_to_text, query_to_query_list};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query did not decode
    Parse(crate::ParseError),
    /// A pair failed to cast under the schema
    Transform(crate::TransformError),
    /// Query could not be compiled into a matcher
    Eval(crate::EvalError),
    /// Query list conversion failed
    Map(crate::MapError),
    /// Schema file is malformed
    Schema(crate::SchemaError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// `--now` is not an RFC 3339 timestamp
    InvalidNow(String),
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Transform(e) => write!(f, "Transform error: {}", e),
            CliError::Eval(e) => write!(f, "Evaluation error: {}", e),
            CliError::Map(e) => write!(f, "Query list error: {}", e),
            CliError::Schema(e) => write!(f, "Schema error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe JSON to stdin."),
            CliError::InvalidNow(raw) => {
                write!(f, "Invalid --now value '{}': expected an RFC 3339 timestamp", raw)
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'sift docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Transform(e) => Some(e),
            CliError::Eval(e) => Some(e),
            CliError::Map(e) => Some(e),
            CliError::Schema(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::TransformError> for CliError {
    fn from(e: crate::TransformError) -> Self {
        CliError::Transform(e)
    }
}

impl From<crate::EvalError> for CliError {
    fn from(e: crate::EvalError) -> Self {
        CliError::Eval(e)
    }
}

impl From<crate::MapError> for CliError {
    fn from(e: crate::MapError) -> Self {
        CliError::Map(e)
    }
}

impl From<crate::SchemaError> for CliError {
    fn from(e: crate::SchemaError) -> Self {
        CliError::Schema(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Parse the `--now` anchor.
pub fn parse_now(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, CliError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| CliError::InvalidNow(raw.to_string()))
}
