//! Casting decoded items into typed values under a [`Schema`].
//!
//! [`transform_pair`] handles a single `key:value` term. [`transform`] walks
//! a whole decoded query, rewriting every pair key to its backing field
//! name. [`materialize_bounds`] turns partial dates and times into concrete
//! instants once the caller is ready to compare against real data.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::ast::{CmpOp, ItemKind, SearchItem};
use crate::config::TransformContext;
use crate::encoder::encode;
use crate::schema::{EnumDef, FieldRule, Kind, Schema};
use crate::temporal::{self, Bound, TemporalKind, parse_temporal};
use crate::value::Value;

static ULID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9A-HJKMNP-TV-Z]{26}$").expect("valid ulid regex"));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("unknown field `{key}`{}", did_you_mean(.suggestions))]
    KeyNotFound { key: String, suggestions: Vec<String> },

    #[error("`{value}` is not a valid {enumeration} for field `{field}`")]
    InvalidEnumValue {
        field: String,
        enumeration: String,
        value: String,
    },

    #[error("field `{field}`: cannot cast `{raw}` as {} ({reason})", .attempted.join(" or "))]
    Value {
        field: String,
        raw: String,
        /// Type names tried, in order
        attempted: Vec<&'static str>,
        reason: String,
    },

    #[error("field `{field}` does not support {term} search terms")]
    UnsupportedSearchTerm { field: String, term: &'static str },

    #[error("field `{field}`: {message}")]
    Custom { field: String, message: String },
}

fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(", did you mean `{}`?", only),
        many => format!(", did you mean one of: {}?", many.join(", ")),
    }
}

/// Cast the value of `field` according to its rule.
///
/// Returns the backing field name and the cast value.
pub fn transform_pair(
    field: &str,
    value: SearchItem,
    schema: &Schema,
    ctx: &TransformContext,
) -> Result<(String, SearchItem), TransformError> {
    let entry = schema.lookup(field).ok_or_else(|| key_not_found(field, schema))?;
    log::trace!("casting `{}` as {:?}", field, entry.rule);

    let cast = match &entry.rule {
        FieldRule::Custom(apply) => {
            apply(&value, ctx).map_err(|message| TransformError::Custom {
                field: field.to_string(),
                message,
            })?
        }
        rule => {
            let caster = Caster { field, rule, schema, ctx };
            caster.cast(value)?
        }
    };

    Ok((entry.source.clone(), cast))
}

/// Transform every pair in a decoded query.
///
/// Free-text terms outside pairs are left alone.
pub fn transform(
    items: Vec<SearchItem>,
    schema: &Schema,
    ctx: &TransformContext,
) -> Result<Vec<SearchItem>, TransformError> {
    items.into_iter().map(|item| transform_item(item, schema, ctx)).collect()
}

fn transform_item(item: SearchItem, schema: &Schema, ctx: &TransformContext) -> Result<SearchItem, TransformError> {
    let position = item.position;
    let kind = match item.kind {
        ItemKind::Pair { key, value } => {
            let name = key_name(&key);
            let (source, cast) = transform_pair(&name, *value, schema, ctx)?;
            ItemKind::Pair {
                key: Box::new(SearchItem::word(source).at(key.position)),
                value: Box::new(cast),
            }
        }
        ItemKind::Group(items) => ItemKind::Group(transform(items, schema, ctx)?),
        ItemKind::And(left, right) => {
            ItemKind::And(Box::new(transform_item(*left, schema, ctx)?), transform(right, schema, ctx)?)
        }
        ItemKind::Or(left, right) => {
            ItemKind::Or(Box::new(transform_item(*left, schema, ctx)?), transform(right, schema, ctx)?)
        }
        ItemKind::Not(inner) => ItemKind::Not(Box::new(transform_item(*inner, schema, ctx)?)),
        other => other,
    };
    Ok(SearchItem::new(kind).at(position))
}

fn key_name(key: &SearchItem) -> String {
    match &key.kind {
        ItemKind::Word(s) | ItemKind::Quote(s) => s.clone(),
        ItemKind::Value(v) => v.to_text(),
        _ => encode(std::slice::from_ref(key)),
    }
}

fn key_not_found(key: &str, schema: &Schema) -> TransformError {
    TransformError::KeyNotFound {
        key: key.to_string(),
        suggestions: schema.suggest(key),
    }
}

/// Applies one type or enum rule to every leaf of a value.
struct Caster<'a> {
    field: &'a str,
    rule: &'a FieldRule,
    schema: &'a Schema,
    ctx: &'a TransformContext,
}

impl Caster<'_> {
    fn cast(&self, item: SearchItem) -> Result<SearchItem, TransformError> {
        let position = item.position;
        let kind = match item.kind {
            ItemKind::Word(raw) | ItemKind::Quote(raw) => ItemKind::Value(self.cast_literal(&raw)?),
            ItemKind::Pin(inner) => ItemKind::Pin(Box::new(self.resolve_pin(*inner)?)),
            ItemKind::Cmp { op, value } => ItemKind::Cmp {
                op,
                value: Box::new(self.cast(*value)?),
            },
            ItemKind::Range { start, end } => ItemKind::Range {
                start: Box::new(self.cast(*start)?),
                end: Box::new(self.cast(*end)?),
            },
            ItemKind::List(items) => ItemKind::List(self.cast_all(items)?),
            ItemKind::Group(items) => ItemKind::Group(self.cast_all(items)?),
            ItemKind::And(left, right) => ItemKind::And(Box::new(self.cast(*left)?), self.cast_all(right)?),
            ItemKind::Or(left, right) => ItemKind::Or(Box::new(self.cast(*left)?), self.cast_all(right)?),
            ItemKind::Not(inner) => ItemKind::Not(Box::new(self.cast(*inner)?)),
            ItemKind::Partial(items) => {
                if !self.rule.kind().is_some_and(Kind::accepts_partial) {
                    return Err(self.unsupported("partial"));
                }
                ItemKind::Partial(items)
            }
            ItemKind::Pair { .. } => return Err(self.unsupported("pair")),
            structural => structural,
        };
        Ok(SearchItem::new(kind).at(position))
    }

    fn cast_all(&self, items: Vec<SearchItem>) -> Result<Vec<SearchItem>, TransformError> {
        items.into_iter().map(|item| self.cast(item)).collect()
    }

    fn unsupported(&self, term: &'static str) -> TransformError {
        TransformError::UnsupportedSearchTerm {
            field: self.field.to_string(),
            term,
        }
    }

    /// `^name` refers to another field: check it exists and point at its
    /// backing name.
    fn resolve_pin(&self, inner: SearchItem) -> Result<SearchItem, TransformError> {
        let name = key_name(&inner);
        let entry = self
            .schema
            .lookup(&name)
            .ok_or_else(|| key_not_found(&name, self.schema))?;
        Ok(SearchItem::value(Value::Atom(entry.source.clone())).at(inner.position))
    }

    fn cast_literal(&self, raw: &str) -> Result<Value, TransformError> {
        match self.rule {
            FieldRule::Type(kind) => cast_kind(*kind, raw, self.ctx).map_err(|(attempted, reason)| {
                TransformError::Value {
                    field: self.field.to_string(),
                    raw: raw.to_string(),
                    attempted,
                    reason,
                }
            }),
            FieldRule::Enum(def) => self.cast_enum(def, raw),
            FieldRule::Custom(_) => Err(self.unsupported("custom")),
        }
    }

    fn cast_enum(&self, def: &EnumDef, raw: &str) -> Result<Value, TransformError> {
        def.cast(raw)
            .map(|variant| Value::Atom(variant.to_string()))
            .ok_or_else(|| TransformError::InvalidEnumValue {
                field: self.field.to_string(),
                enumeration: def.name.clone(),
                value: raw.to_string(),
            })
    }
}

type CastFailure = (Vec<&'static str>, String);

/// Cast raw text to a value of `kind`.
pub fn cast_kind(kind: Kind, raw: &str, ctx: &TransformContext) -> Result<Value, CastFailure> {
    let fail = |reason: &str| (vec![kind.name()], reason.to_string());

    match kind {
        Kind::BinaryId | Kind::Uuid => Uuid::parse_str(raw)
            .map(Value::Uuid)
            .map_err(|e| fail(&e.to_string())),
        Kind::Ulid => {
            if ULID.is_match(raw) {
                Ok(Value::Ulid(raw.to_ascii_uppercase()))
            } else {
                Err(fail("expected 26 Crockford base32 characters"))
            }
        }
        Kind::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Boolean(true)),
            "false" | "0" => Ok(Value::Boolean(false)),
            _ => Err(fail("expected true or false")),
        },
        Kind::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| fail(&e.to_string())),
        Kind::Float => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Float(n)),
            Ok(_) => Err(fail("not a finite number")),
            Err(e) => Err(fail(&e.to_string())),
        },
        Kind::Decimal => Decimal::from_str(raw)
            .map(Value::Decimal)
            .map_err(|e| fail(&e.to_string())),
        Kind::Atom => Ok(Value::Atom(raw.to_string())),
        Kind::String => Ok(Value::String(raw.to_string())),
        Kind::Date => cast_temporal(TemporalKind::Date, raw, ctx),
        Kind::Time => cast_temporal(TemporalKind::Time, raw, ctx),
        Kind::NaiveDateTime => cast_temporal(TemporalKind::NaiveDateTime, raw, ctx),
        Kind::UtcDateTime => cast_temporal(TemporalKind::UtcDateTime, raw, ctx),
    }
}

fn cast_temporal(kind: TemporalKind, raw: &str, ctx: &TransformContext) -> Result<Value, CastFailure> {
    parse_temporal(kind, raw, ctx.now).map_err(|e| {
        let reason = match &e.keyword {
            Some(keyword) => keyword.to_string(),
            None => "no matching format".to_string(),
        };
        (e.attempted, reason)
    })
}

/// Which end of a partial value a comparison anchors to.
fn cmp_bound(op: CmpOp) -> Option<Bound> {
    match op {
        CmpOp::Gt | CmpOp::Lte => Some(Bound::End),
        CmpOp::Gte | CmpOp::Lt => Some(Bound::Start),
        CmpOp::Eq | CmpOp::Neq | CmpOp::Fuzz | CmpOp::NFuzz => None,
    }
}

/// Replace partial dates and times in `item` with concrete instants.
///
/// Range starts resolve to the first instant the partial value covers and
/// range ends to the last. `>` and `<=` compare against the last instant,
/// `>=` and `<` against the first. A bare partial value becomes the range
/// it covers. `kind` is the field's temporal type, so partial values on a
/// UTC field come back as UTC instants.
pub fn materialize_bounds(
    field: &str,
    item: SearchItem,
    kind: Option<TemporalKind>,
) -> Result<SearchItem, TransformError> {
    let position = item.position;
    let resolve = |value: &Value, bound: Bound| -> Result<Value, TransformError> {
        temporal::materialize_for(kind, value, bound).ok_or_else(|| TransformError::Value {
            field: field.to_string(),
            raw: value.to_text(),
            attempted: vec![value.type_name()],
            reason: "partial value out of range".to_string(),
        })
    };

    let resolved = match item.kind {
        ItemKind::Value(value) if value.is_partial() => SearchItem::range(
            SearchItem::value(resolve(&value, Bound::Start)?).at(position),
            SearchItem::value(resolve(&value, Bound::End)?).at(position),
        ),
        ItemKind::Range { start, end } => SearchItem::range(
            resolve_side(*start, Bound::Start, &resolve)?,
            resolve_side(*end, Bound::End, &resolve)?,
        ),
        ItemKind::Cmp { op, value } => {
            let anchored = match (cmp_bound(op), &value.kind) {
                (Some(bound), ItemKind::Value(v)) if v.is_partial() => Some(resolve(v, bound)?),
                _ => None,
            };
            match anchored {
                Some(resolved) => SearchItem::cmp(op, SearchItem::value(resolved).at(value.position)),
                None => SearchItem::cmp(op, materialize_bounds(field, *value, kind)?),
            }
        }
        ItemKind::List(items) => SearchItem::list(materialize_all(field, items, kind)?),
        ItemKind::Group(items) => SearchItem::group(materialize_all(field, items, kind)?),
        ItemKind::Not(inner) => SearchItem::not(materialize_bounds(field, *inner, kind)?),
        ItemKind::And(left, right) => SearchItem::and(
            materialize_bounds(field, *left, kind)?,
            materialize_all(field, right, kind)?,
        ),
        ItemKind::Or(left, right) => SearchItem::or(
            materialize_bounds(field, *left, kind)?,
            materialize_all(field, right, kind)?,
        ),
        other => SearchItem::new(other),
    };
    Ok(resolved.at(position))
}

fn resolve_side<F>(side: SearchItem, bound: Bound, resolve: &F) -> Result<SearchItem, TransformError>
where
    F: Fn(&Value, Bound) -> Result<Value, TransformError>,
{
    match &side.kind {
        ItemKind::Value(value) if value.is_partial() => {
            Ok(SearchItem::value(resolve(value, bound)?).at(side.position))
        }
        _ => Ok(side),
    }
}

fn materialize_all(
    field: &str,
    items: Vec<SearchItem>,
    kind: Option<TemporalKind>,
) -> Result<Vec<SearchItem>, TransformError> {
    items
        .into_iter()
        .map(|item| materialize_bounds(field, item, kind))
        .collect()
}

/// Materialize every pair of a transformed query.
///
/// Pair keys are looked up as backing names first, then as public keys.
pub fn materialize(items: Vec<SearchItem>, schema: &Schema) -> Result<Vec<SearchItem>, TransformError> {
    items.into_iter().map(|item| materialize_item(item, schema)).collect()
}

fn materialize_item(item: SearchItem, schema: &Schema) -> Result<SearchItem, TransformError> {
    let position = item.position;
    let resolved = match item.kind {
        ItemKind::Pair { key, value } => {
            let name = key_name(&key);
            let kind = schema
                .by_source(&name)
                .or_else(|| schema.lookup(&name))
                .and_then(|entry| entry.rule.kind())
                .and_then(Kind::temporal);
            SearchItem::pair(*key, materialize_bounds(&name, *value, kind)?)
        }
        ItemKind::Group(items) => SearchItem::group(materialize(items, schema)?),
        ItemKind::And(left, right) => {
            SearchItem::and(materialize_item(*left, schema)?, materialize(right, schema)?)
        }
        ItemKind::Or(left, right) => SearchItem::or(materialize_item(*left, schema)?, materialize(right, schema)?),
        ItemKind::Not(inner) => SearchItem::not(materialize_item(*inner, schema)?),
        other => SearchItem::new(other),
    };
    Ok(resolved.at(position))
}
