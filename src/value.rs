use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::temporal::{PartialDate, PartialDateTime, PartialTime};

/// A literal after it has been cast under a field's declared type.
///
/// Words and quotes become values in the transform layer; the encoder knows
/// how to write every variant back as query text.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
///
/// assert_eq!(Value::Boolean(true).to_text(), "true");
/// assert_eq!(Value::Integer(-4).to_text(), "-4");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),

    Integer(i64),

    Float(f64),

    /// Arbitrary precision decimal, written in normal form
    Decimal(Decimal),

    String(String),

    /// Symbolic name, such as an enum variant or a resolved field reference
    Atom(String),

    Uuid(Uuid),

    /// Canonical upper-case Crockford base32 ULID
    Ulid(String),

    Date(NaiveDate),

    Time(NaiveTime),

    NaiveDateTime(NaiveDateTime),

    UtcDateTime(DateTime<Utc>),

    /// `YYYY` or `YYYY-MM` given for a date field
    PartialDate(PartialDate),

    /// `HH` or `HH:MM` given for a time field
    PartialTime(PartialTime),

    /// A truncated timestamp given for a datetime field
    PartialDateTime(PartialDateTime),
}

impl Value {
    /// Name of the variant, as used in the schema's type names.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Atom(_) => "atom",
            Value::Uuid(_) => "uuid",
            Value::Ulid(_) => "ulid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::NaiveDateTime(_) => "naive_datetime",
            Value::UtcDateTime(_) => "utc_datetime",
            Value::PartialDate(_) => "partial_date",
            Value::PartialTime(_) => "partial_time",
            Value::PartialDateTime(_) => "partial_datetime",
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            Value::PartialDate(_) | Value::PartialTime(_) | Value::PartialDateTime(_)
        )
    }

    /// Canonical text of the value, without any quoting.
    pub fn to_text(&self) -> String {
        match self {
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.normalize().to_string(),
            Value::String(s) | Value::Atom(s) | Value::Ulid(s) => s.clone(),
            Value::Uuid(u) => u.hyphenated().to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::NaiveDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::UtcDateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::PartialDate(p) => p.to_string(),
            Value::PartialTime(p) => p.to_string(),
            Value::PartialDateTime(p) => p.to_string(),
        }
    }
}
