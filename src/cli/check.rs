//! Match sift queries against JSON input

use chrono::{DateTime, Utc};

use super::CliError;
use crate::{DecodeOptions, Decoder, Schema, TransformContext, evaluator, transform};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The sift query to run
    pub query: String,
    /// JSON input string: one document or an array of documents
    pub input: Option<String>,
    /// Cast pairs under this schema before matching
    pub schema: Option<Schema>,
    /// Anchor for relative dates such as `@yesterday`
    pub now: DateTime<Utc>,
    pub decode: DecodeOptions,
    /// Only validate syntax (and the schema, when given), don't match
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Query decoded (and cast) without errors
    SyntaxValid,
    /// Matching documents: an array for array input, otherwise the
    /// document itself or null
    Matches(serde_json::Value),
}

/// Execute a sift check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let mut items = Decoder::with_options(options.decode).parse(&options.query)?;

    if let Some(schema) = &options.schema {
        let ctx = TransformContext::at(options.now);
        items = transform::transform(items, schema, &ctx)?;
        items = transform::materialize(items, schema)?;
    }

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let input: serde_json::Value = serde_json::from_str(json_str)?;

    let matcher = evaluator::compile(&items)?;
    log::debug!("compiled matcher: {:?}", matcher);

    let output = match input {
        serde_json::Value::Array(docs) => {
            serde_json::Value::Array(matcher.filter(&docs).into_iter().cloned().collect())
        }
        doc if matcher.matches(&doc) => doc,
        _ => serde_json::Value::Null,
    };
    Ok(CheckResult::Matches(output))
}
