//! Query text <-> query list conversion for the CLI

use super::CliError;
use crate::{DecodeOptions, Decoder, encode, mapper};

/// Decode a query and render it as a JSON query list
pub fn query_to_query_list(query: &str, options: DecodeOptions) -> Result<serde_json::Value, CliError> {
    let items = Decoder::with_options(options).parse(query)?;
    let list = mapper::search_list_to_query_list(&items)?;
    Ok(serde_json::to_value(list)?)
}

/// Read a JSON query list and render it as query text
pub fn query_list_to_text(json: &str) -> Result<String, CliError> {
    let list = mapper::query_list_from_json(json)?;
    let items = mapper::query_list_to_search_list(&list)?;
    Ok(encode(&items))
}

/// Re-encode a query in canonical form
pub fn format_query(query: &str, options: DecodeOptions) -> Result<String, CliError> {
    let items = Decoder::with_options(options).parse(query)?;
    Ok(encode(&items))
}
