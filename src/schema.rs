//! The allow-list of searchable fields.
//!
//! A schema maps the keys users may write (`created:2020`) to the backing
//! field name and to the rule that casts raw words into typed values. Rules
//! are resolved once, when the schema is built, never per query.
//!
//! Schemas are built in code or loaded from JSON:
//!
//! ```json
//! {"fields": {
//!    "name":    {"type": "string"},
//!    "status":  {"enum": {"name": "Status", "values": ["active", "archived"]}},
//!    "created": {"type": "utc_datetime", "source": "inserted_at"}
//! }}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::SearchItem;
use crate::config::TransformContext;
use crate::temporal::TemporalKind;

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    BinaryId,
    Uuid,
    Ulid,
    Boolean,
    Integer,
    Float,
    Decimal,
    Atom,
    String,
    Date,
    Time,
    #[serde(rename = "naive_datetime")]
    NaiveDateTime,
    #[serde(rename = "utc_datetime")]
    UtcDateTime,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::BinaryId => "binary_id",
            Kind::Uuid => "uuid",
            Kind::Ulid => "ulid",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Decimal => "decimal",
            Kind::Atom => "atom",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::NaiveDateTime => "naive_datetime",
            Kind::UtcDateTime => "utc_datetime",
        }
    }

    pub fn temporal(self) -> Option<TemporalKind> {
        match self {
            Kind::Date => Some(TemporalKind::Date),
            Kind::Time => Some(TemporalKind::Time),
            Kind::NaiveDateTime => Some(TemporalKind::NaiveDateTime),
            Kind::UtcDateTime => Some(TemporalKind::UtcDateTime),
            _ => None,
        }
    }

    /// Whether values of this type can be matched with `*`/`?` patterns.
    pub fn accepts_partial(self) -> bool {
        matches!(self, Kind::String | Kind::Atom)
    }
}

/// A closed set of symbolic values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDef {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumDef {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The declared variant `raw` names, matched exactly first, then
    /// ignoring ASCII case.
    pub fn cast(&self, raw: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.as_str() == raw)
            .or_else(|| self.values.iter().find(|v| v.eq_ignore_ascii_case(raw)))
            .map(String::as_str)
    }
}

/// Caller-supplied cast, given the whole value of a pair.
pub type CustomCast = fn(&SearchItem, &TransformContext) -> Result<SearchItem, String>;

#[derive(Clone)]
pub enum FieldRule {
    Type(Kind),
    Enum(EnumDef),
    Custom(CustomCast),
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Type(kind) => f.debug_tuple("Type").field(kind).finish(),
            FieldRule::Enum(def) => f.debug_tuple("Enum").field(&def.name).finish(),
            FieldRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FieldRule {
    pub fn kind(&self) -> Option<Kind> {
        match self {
            FieldRule::Type(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Name of the backing field
    pub source: String,
    pub rule: FieldRule,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field `{field}`: {reason}")]
    Field { field: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed field whose backing name is the key itself.
    pub fn field(self, key: &str, kind: Kind) -> Self {
        self.insert(key, key, FieldRule::Type(kind))
    }

    /// Add a typed field stored under a different backing name.
    pub fn aliased(self, key: &str, source: &str, kind: Kind) -> Self {
        self.insert(key, source, FieldRule::Type(kind))
    }

    pub fn enumeration(self, key: &str, def: EnumDef) -> Self {
        self.insert(key, key, FieldRule::Enum(def))
    }

    pub fn custom(self, key: &str, cast: CustomCast) -> Self {
        self.insert(key, key, FieldRule::Custom(cast))
    }

    pub fn insert(mut self, key: &str, source: &str, rule: FieldRule) -> Self {
        self.fields.insert(
            key.to_string(),
            FieldSpec {
                source: source.to_string(),
                rule,
            },
        );
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.get(key)
    }

    /// Spec of the field stored under `source`.
    pub fn by_source(&self, source: &str) -> Option<&FieldSpec> {
        self.fields.values().find(|entry| entry.source == source)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Known keys close to `key`, best match first, at most three.
    pub fn suggest(&self, key: &str) -> Vec<String> {
        let limit = (key.chars().count() / 3).max(2);
        let lowered = key.to_lowercase();
        let mut scored: Vec<(usize, &str)> = self
            .keys()
            .map(|known| (levenshtein_distance(&lowered, &known.to_lowercase()), known))
            .filter(|(distance, _)| *distance <= limit)
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, k)| k.to_string()).collect()
    }

    pub fn from_json(json: &str) -> Result<Schema, SchemaError> {
        let file: SchemaFile = serde_json::from_str(json)?;
        let mut schema = Schema::new();

        for (key, entry) in file.fields {
            let source = entry.source.as_deref().unwrap_or(&key).to_string();
            let rule = match (entry.kind, entry.enumeration) {
                (Some(kind), None) => FieldRule::Type(kind),
                (None, Some(enumeration)) => {
                    let def = match enumeration {
                        EnumEntry::Values(values) => EnumDef::new(key.clone(), values),
                        EnumEntry::Named { name, values } => EnumDef::new(name, values),
                    };
                    if def.values.is_empty() {
                        return Err(SchemaError::Field {
                            field: key,
                            reason: "enum has no values".to_string(),
                        });
                    }
                    FieldRule::Enum(def)
                }
                (Some(_), Some(_)) => {
                    return Err(SchemaError::Field {
                        field: key,
                        reason: "give either `type` or `enum`, not both".to_string(),
                    });
                }
                (None, None) => {
                    return Err(SchemaError::Field {
                        field: key,
                        reason: "missing `type` or `enum`".to_string(),
                    });
                }
            };
            schema = schema.insert(&key, &source, rule);
        }

        log::debug!("loaded schema with {} fields", schema.len());
        Ok(schema)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    fields: BTreeMap<String, FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    #[serde(rename = "type")]
    kind: Option<Kind>,
    #[serde(rename = "enum")]
    enumeration: Option<EnumEntry>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnumEntry {
    Values(Vec<String>),
    Named { name: String, values: Vec<String> },
}

/// Edit distance between two strings, counted in characters.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1: Vec<char> = s1.chars().collect();
    let s2: Vec<char> = s2.chars().collect();

    if s1.is_empty() {
        return s2.len();
    }
    if s2.is_empty() {
        return s1.len();
    }

    let mut prev_row: Vec<usize> = (0..=s2.len()).collect();
    let mut curr_row = vec![0; s2.len() + 1];

    for (i, c1) in s1.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, c2) in s2.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[s2.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_suggest_orders_by_distance() {
        let schema = Schema::new()
            .field("name", Kind::String)
            .field("names", Kind::String)
            .field("created_at", Kind::UtcDateTime);
        assert_eq!(schema.suggest("nme"), vec!["name", "names"]);
        assert!(schema.suggest("zzzzzz").is_empty());
    }

    #[test]
    fn test_enum_cast_prefers_exact_case() {
        let def = EnumDef::new("Status", ["Active", "active"]);
        assert_eq!(def.cast("active"), Some("active"));
        assert_eq!(def.cast("ACTIVE"), Some("Active"));
        assert_eq!(def.cast("gone"), None);
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(
            r#"{"fields": {
                "created": {"type": "utc_datetime", "source": "inserted_at"},
                "status": {"enum": ["open", "closed"]}
            }}"#,
        )
        .unwrap();
        let created = schema.lookup("created").unwrap();
        assert_eq!(created.source, "inserted_at");
        assert_eq!(created.rule.kind(), Some(Kind::UtcDateTime));
        assert!(matches!(schema.lookup("status").unwrap().rule, FieldRule::Enum(_)));
    }

    #[test]
    fn test_from_json_rejects_unknown_type() {
        assert!(matches!(
            Schema::from_json(r#"{"fields": {"x": {"type": "matrix"}}}"#),
            Err(SchemaError::Json(_))
        ));
    }
}
