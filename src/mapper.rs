//! The query-list interchange format.
//!
//! A query list is the JSON-friendly twin of a decoded query: one object per
//! top-level item.
//!
//! ```json
//! [
//!   {"key": "name", "value": {"$partial": ["jo", {"$wildcard": true}]}},
//!   {"key": "age", "op": "gte", "value": "21"},
//!   {"key": "tags", "op": "in", "value": ["a", "b"]},
//!   {"value": "free text"}
//! ]
//! ```
//!
//! Plain strings map back to words when they are word-safe and to quotes
//! otherwise; `{"$quote": s}` keeps a word-safe quote a quote, for keys as
//! well as values. Logical operators have no query-list form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{CmpOp, ItemKind, SearchItem};
use crate::encoder::is_bare_word;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("{term} items have no query-list form")]
    Unsupported { term: &'static str },

    #[error("invalid query item: {0}")]
    Invalid(String),

    #[error("invalid query list JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<QueryKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<QueryOp>,
    pub value: QueryValue,
}

/// A pair key: a plain string, or `{"$quote": s}` for a quoted word-safe key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryKey {
    Text(String),
    Quote {
        #[serde(rename = "$quote")]
        quote: String,
    },
}

impl From<&str> for QueryKey {
    fn from(text: &str) -> Self {
        QueryKey::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    In,
    Fuzz,
    NFuzz,
}

impl QueryOp {
    fn from_cmp(op: CmpOp) -> Self {
        match op {
            CmpOp::Gt => QueryOp::Gt,
            CmpOp::Gte => QueryOp::Gte,
            CmpOp::Lt => QueryOp::Lt,
            CmpOp::Lte => QueryOp::Lte,
            CmpOp::Eq => QueryOp::Eq,
            CmpOp::Neq => QueryOp::Neq,
            CmpOp::Fuzz => QueryOp::Fuzz,
            CmpOp::NFuzz => QueryOp::NFuzz,
        }
    }

    /// The comparison operator, or `None` for `in`.
    fn to_cmp(self) -> Option<CmpOp> {
        match self {
            QueryOp::Gt => Some(CmpOp::Gt),
            QueryOp::Gte => Some(CmpOp::Gte),
            QueryOp::Lt => Some(CmpOp::Lt),
            QueryOp::Lte => Some(CmpOp::Lte),
            QueryOp::Eq => Some(CmpOp::Eq),
            QueryOp::Neq => Some(CmpOp::Neq),
            QueryOp::Fuzz => Some(CmpOp::Fuzz),
            QueryOp::NFuzz => Some(CmpOp::NFuzz),
            QueryOp::In => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<QueryValue>),
    Marker(Marker),
}

/// Single-key objects for the items that have no plain JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = "$partial")]
    Partial(Vec<QueryValue>),
    #[serde(rename = "$wildcard")]
    Wildcard(bool),
    #[serde(rename = "$any_char")]
    AnyChar(bool),
    #[serde(rename = "$infinity")]
    Infinity(bool),
    #[serde(rename = "$range")]
    Range(Box<QueryValue>, Box<QueryValue>),
    #[serde(rename = "$quote")]
    Quote(String),
    #[serde(rename = "$pin")]
    Pin(String),
    #[serde(rename = "$group")]
    Group(Vec<QueryValue>),
}

pub fn search_list_to_query_list(items: &[SearchItem]) -> Result<Vec<QueryItem>, MapError> {
    let list = items.iter().map(to_query_item).collect::<Result<Vec<_>, _>>()?;
    log::debug!("mapped {} items to a query list", list.len());
    Ok(list)
}

pub fn query_list_to_search_list(list: &[QueryItem]) -> Result<Vec<SearchItem>, MapError> {
    let items = list.iter().map(from_query_item).collect::<Result<Vec<_>, _>>()?;
    log::debug!("mapped a query list to {} items", items.len());
    Ok(items)
}

/// Parse a JSON query list.
pub fn query_list_from_json(json: &str) -> Result<Vec<QueryItem>, MapError> {
    Ok(serde_json::from_str(json)?)
}

fn to_query_item(item: &SearchItem) -> Result<QueryItem, MapError> {
    match &item.kind {
        ItemKind::Pair { key, value } => {
            let key = match &key.kind {
                ItemKind::Quote(s) if is_bare_word(s) => QueryKey::Quote { quote: s.clone() },
                ItemKind::Word(s) | ItemKind::Quote(s) => QueryKey::Text(s.clone()),
                ItemKind::Value(v) => QueryKey::Text(v.to_text()),
                _ => return Err(MapError::Unsupported { term: key.term_name() }),
            };
            let (op, value) = operator_and_value(value)?;
            Ok(QueryItem {
                key: Some(key),
                op,
                value,
            })
        }
        _ => {
            let (op, value) = operator_and_value(item)?;
            Ok(QueryItem { key: None, op, value })
        }
    }
}

fn operator_and_value(item: &SearchItem) -> Result<(Option<QueryOp>, QueryValue), MapError> {
    match &item.kind {
        ItemKind::Cmp { op, value } => Ok((Some(QueryOp::from_cmp(*op)), to_query_value(value)?)),
        ItemKind::List(_) => Ok((Some(QueryOp::In), to_query_value(item)?)),
        _ => Ok((None, to_query_value(item)?)),
    }
}

fn to_query_value(item: &SearchItem) -> Result<QueryValue, MapError> {
    let value = match &item.kind {
        ItemKind::Null => QueryValue::Null,
        ItemKind::Word(s) => QueryValue::Text(s.clone()),
        ItemKind::Quote(s) if is_bare_word(s) => QueryValue::Marker(Marker::Quote(s.clone())),
        ItemKind::Quote(s) => QueryValue::Text(s.clone()),
        ItemKind::Value(Value::Boolean(b)) => QueryValue::Bool(*b),
        ItemKind::Value(Value::Integer(n)) => QueryValue::Integer(*n),
        ItemKind::Value(Value::Float(n)) => QueryValue::Float(*n),
        ItemKind::Value(other) => QueryValue::Text(other.to_text()),
        ItemKind::Wildcard => QueryValue::Marker(Marker::Wildcard(true)),
        ItemKind::AnyChar => QueryValue::Marker(Marker::AnyChar(true)),
        ItemKind::Infinity => QueryValue::Marker(Marker::Infinity(true)),
        ItemKind::Partial(items) => QueryValue::Marker(Marker::Partial(to_query_values(items)?)),
        ItemKind::Range { start, end } => QueryValue::Marker(Marker::Range(
            Box::new(to_query_value(start)?),
            Box::new(to_query_value(end)?),
        )),
        ItemKind::List(items) => QueryValue::List(to_query_values(items)?),
        ItemKind::Group(items) => QueryValue::Marker(Marker::Group(to_query_values(items)?)),
        ItemKind::Pin(inner) => match &inner.kind {
            ItemKind::Word(s) | ItemKind::Quote(s) => QueryValue::Marker(Marker::Pin(s.clone())),
            ItemKind::Value(v) => QueryValue::Marker(Marker::Pin(v.to_text())),
            _ => return Err(MapError::Unsupported { term: "pin" }),
        },
        ItemKind::Pair { .. } | ItemKind::Cmp { .. } | ItemKind::And(..) | ItemKind::Or(..) | ItemKind::Not(_) => {
            return Err(MapError::Unsupported {
                term: item.term_name(),
            });
        }
    };
    Ok(value)
}

fn to_query_values(items: &[SearchItem]) -> Result<Vec<QueryValue>, MapError> {
    items.iter().map(to_query_value).collect()
}

fn from_query_item(entry: &QueryItem) -> Result<SearchItem, MapError> {
    let value = from_query_value(&entry.value)?;
    let value = match entry.op.map(QueryOp::to_cmp) {
        Some(Some(op)) => SearchItem::cmp(op, value),
        Some(None) if !matches!(entry.value, QueryValue::List(_)) => {
            return Err(MapError::Invalid("`in` needs a list value".to_string()));
        }
        _ => value,
    };

    Ok(match &entry.key {
        Some(QueryKey::Text(key)) => SearchItem::pair(text_item(key), value),
        Some(QueryKey::Quote { quote }) => SearchItem::pair(SearchItem::quote(quote.clone()), value),
        None => value,
    })
}

fn from_query_value(value: &QueryValue) -> Result<SearchItem, MapError> {
    let item = match value {
        QueryValue::Null => SearchItem::null(),
        QueryValue::Bool(b) => SearchItem::value(Value::Boolean(*b)),
        QueryValue::Integer(n) => SearchItem::value(Value::Integer(*n)),
        QueryValue::Float(n) => SearchItem::value(Value::Float(*n)),
        QueryValue::Text(s) => text_item(s),
        QueryValue::List(values) => SearchItem::list(from_query_values(values)?),
        QueryValue::Marker(marker) => match marker {
            Marker::Partial(values) => SearchItem::partial(from_query_values(values)?),
            Marker::Wildcard(_) => SearchItem::wildcard(),
            Marker::AnyChar(_) => SearchItem::any_char(),
            Marker::Infinity(_) => SearchItem::infinity(),
            Marker::Range(start, end) => SearchItem::range(from_query_value(start)?, from_query_value(end)?),
            Marker::Quote(s) => SearchItem::quote(s.clone()),
            Marker::Pin(name) => SearchItem::pin(text_item(name)),
            Marker::Group(values) => SearchItem::group(from_query_values(values)?),
        },
    };
    Ok(item)
}

fn from_query_values(values: &[QueryValue]) -> Result<Vec<SearchItem>, MapError> {
    values.iter().map(from_query_value).collect()
}

fn text_item(text: &str) -> SearchItem {
    if is_bare_word(text) {
        SearchItem::word(text)
    } else {
        SearchItem::quote(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_item_json_shape() {
        let item = QueryItem {
            key: Some("tags".into()),
            op: Some(QueryOp::In),
            value: QueryValue::List(vec![
                QueryValue::Text("a".to_string()),
                QueryValue::Marker(Marker::Wildcard(true)),
            ]),
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"key": "tags", "op": "in", "value": ["a", {"$wildcard": true}]})
        );
    }

    #[test]
    fn test_quoted_key_json_shape() {
        let item: QueryItem =
            serde_json::from_value(json!({"key": {"$quote": "abc"}, "value": "x"})).unwrap();
        assert_eq!(
            item.key,
            Some(QueryKey::Quote {
                quote: "abc".to_string()
            })
        );
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"key": {"$quote": "abc"}, "value": "x"})
        );
    }

    #[test]
    fn test_nfuzz_spelling() {
        let item: QueryItem = serde_json::from_value(json!({"op": "nfuzz", "value": "x"})).unwrap();
        assert_eq!(item.op, Some(QueryOp::NFuzz));
    }

    #[test]
    fn test_integer_and_float_values() {
        let values: Vec<QueryValue> = serde_json::from_value(json!([1, 1.5, null])).unwrap();
        assert_eq!(
            values,
            vec![QueryValue::Integer(1), QueryValue::Float(1.5), QueryValue::Null]
        );
    }
}
