//! Date and time parsing for the transform layer.
//!
//! Each temporal field type accepts three spellings, tried in order:
//!
//! 1. the full ISO-8601 form (`2020-03-04`, `18:26:12`, `2020-03-04T18:26:12Z`)
//! 2. a truncated "partial" form (`2020`, `2020-03`, `18`, `18:26`)
//! 3. a keyword datetime (`@today`, `@3-days-ago`), see [`keyword`]
//!
//! When nothing fits, the error lists every form that was attempted.

pub mod keyword;
pub mod partial;

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use thiserror::Error;

pub use keyword::{KeywordError, resolve_keyword};
pub use partial::{Bound, PartialDate, PartialDateTime, PartialTime};

use crate::value::Value;

static PARTIAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(?:-(\d{2}))?$").expect("valid partial date regex"));

static PARTIAL_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(?::(\d{2}))?$").expect("valid partial time regex"));

static PARTIAL_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:[T ](\d{2})(?::(\d{2}))?)?)?)?$")
        .expect("valid partial datetime regex")
});

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M:%S"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// The temporal field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    Time,
    NaiveDateTime,
    UtcDateTime,
}

impl TemporalKind {
    pub fn name(self) -> &'static str {
        match self {
            TemporalKind::Date => "date",
            TemporalKind::Time => "time",
            TemporalKind::NaiveDateTime => "naive_datetime",
            TemporalKind::UtcDateTime => "utc_datetime",
        }
    }

    fn partial_name(self) -> &'static str {
        match self {
            TemporalKind::Date => "partial_date",
            TemporalKind::Time => "partial_time",
            TemporalKind::NaiveDateTime | TemporalKind::UtcDateTime => "partial_datetime",
        }
    }
}

/// No temporal form matched the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{raw}` is not a valid {kind} (tried {})", .attempted.join(", "))]
pub struct TemporalError {
    pub raw: String,
    pub kind: &'static str,
    /// Names of the forms tried, in order.
    pub attempted: Vec<&'static str>,
    /// Why the keyword form failed, when it was tried.
    pub keyword: Option<KeywordError>,
}

/// Parse `raw` as a value of `kind`, resolving keywords against `now`.
pub fn parse_temporal(kind: TemporalKind, raw: &str, now: DateTime<Utc>) -> Result<Value, TemporalError> {
    if raw.starts_with('@') {
        return resolve_keyword(raw, now)
            .map(|at| from_instant(kind, at))
            .map_err(|e| TemporalError {
                raw: raw.to_string(),
                kind: kind.name(),
                attempted: vec![kind.name(), "keyword_datetime"],
                keyword: Some(e),
            });
    }

    parse_full(kind, raw)
        .or_else(|| parse_partial(kind, raw))
        .ok_or_else(|| TemporalError {
            raw: raw.to_string(),
            kind: kind.name(),
            attempted: vec![kind.name(), kind.partial_name()],
            keyword: None,
        })
}

fn from_instant(kind: TemporalKind, at: DateTime<Utc>) -> Value {
    match kind {
        TemporalKind::Date => Value::Date(at.date_naive()),
        TemporalKind::Time => Value::Time(at.time()),
        TemporalKind::NaiveDateTime => Value::NaiveDateTime(at.naive_utc()),
        TemporalKind::UtcDateTime => Value::UtcDateTime(at),
    }
}

fn parse_full(kind: TemporalKind, raw: &str) -> Option<Value> {
    match kind {
        TemporalKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Value::Date),
        TemporalKind::Time => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
            .map(Value::Time),
        TemporalKind::NaiveDateTime => parse_datetime(raw).map(|dt| Value::NaiveDateTime(dt.naive_utc())),
        TemporalKind::UtcDateTime => parse_datetime(raw).map(Value::UtcDateTime),
    }
}

/// RFC 3339 with any offset, or a naive timestamp taken as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.and_utc())
}

fn parse_partial(kind: TemporalKind, raw: &str) -> Option<Value> {
    match kind {
        TemporalKind::Date => {
            let caps = PARTIAL_DATE.captures(raw)?;
            PartialDate::new(caps[1].parse().ok()?, number(caps.get(2))?).map(Value::PartialDate)
        }
        TemporalKind::Time => {
            let caps = PARTIAL_TIME.captures(raw)?;
            PartialTime::new(caps[1].parse().ok()?, number(caps.get(2))?).map(Value::PartialTime)
        }
        TemporalKind::NaiveDateTime | TemporalKind::UtcDateTime => {
            let caps = PARTIAL_DATETIME.captures(raw)?;
            PartialDateTime::new(
                caps[1].parse().ok()?,
                number(caps.get(2))?,
                number(caps.get(3))?,
                number(caps.get(4))?,
                number(caps.get(5))?,
            )
            .map(Value::PartialDateTime)
        }
    }
}

/// `Some(None)` for an absent group, `None` when the group does not parse.
fn number(group: Option<regex::Match<'_>>) -> Option<Option<u32>> {
    match group {
        None => Some(None),
        Some(m) => m.as_str().parse().ok().map(Some),
    }
}

/// Widen a partial value to the instant at `bound`.
///
/// Concrete values are returned unchanged; `None` only when the partial
/// value cannot be represented, which validated partials never hit.
pub fn materialize(value: &Value, bound: Bound) -> Option<Value> {
    let resolved = match value {
        Value::PartialDate(p) => Value::Date(p.resolve(bound)?),
        Value::PartialTime(p) => Value::Time(p.resolve(bound)?),
        Value::PartialDateTime(p) => Value::NaiveDateTime(p.resolve(bound)?),
        other => other.clone(),
    };
    Some(resolved)
}

/// Like [`materialize`], but a partial given for a UTC field comes back as
/// a UTC instant.
pub fn materialize_for(kind: Option<TemporalKind>, value: &Value, bound: Bound) -> Option<Value> {
    match (kind, materialize(value, bound)?) {
        (Some(TemporalKind::UtcDateTime), Value::NaiveDateTime(dt)) if value.is_partial() => {
            Some(Value::UtcDateTime(dt.and_utc()))
        }
        (_, resolved) => Some(resolved),
    }
}
