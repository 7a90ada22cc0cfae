//! Relative date expressions such as `@yesterday` or `@3-days-and-2-weeks-ago`.
//!
//! An expression is a `@` followed by words joined with `-`:
//!
//! ```text
//! @now @today @yesterday @tomorrow                anchors
//! @next-week @last-month @prev-2-days             one step (or n) from now
//! @3-days-ago @1-year-later                       shift from now
//! @2-hours-and-30-minutes-ago                     shifts add up
//! @3-days-from-tomorrow @6-hours-till-now         shift from an anchor
//! ```
//!
//! Everything resolves against an explicit `now`; nothing here reads a clock.

use chrono::{DateTime, Months, NaiveTime, TimeDelta, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword datetimes start with `@`")]
    NotAKeyword,

    #[error("expected an amount, found {found:?}")]
    NoLiteral { found: Option<String> },

    #[error("`{0}` is not a duration unit")]
    InvalidUnit(String),

    #[error("`{0}` is not a recognized anchor")]
    UnknownAnchor(String),

    #[error("expected `ago`, `later`, `from`, `to` or `till` after the duration")]
    MissingDirection,

    #[error("unexpected `{0}` at end of expression")]
    Unexpected(String),

    #[error("shift moves the date out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    Decade,
    Century,
    Millennium,
}

impl Unit {
    pub fn parse(word: &str) -> Option<Unit> {
        let unit = match word {
            "second" | "seconds" => Unit::Second,
            "minute" | "minutes" => Unit::Minute,
            "hour" | "hours" => Unit::Hour,
            "day" | "days" => Unit::Day,
            "week" | "weeks" => Unit::Week,
            "month" | "months" => Unit::Month,
            "year" | "years" => Unit::Year,
            "decade" | "decades" => Unit::Decade,
            "century" | "centuries" => Unit::Century,
            "millennium" | "millennia" | "millenniums" => Unit::Millennium,
            _ => return None,
        };
        Some(unit)
    }

    fn months(self) -> Option<u32> {
        match self {
            Unit::Month => Some(1),
            Unit::Year => Some(12),
            Unit::Decade => Some(120),
            Unit::Century => Some(1_200),
            Unit::Millennium => Some(12_000),
            _ => None,
        }
    }

    fn seconds(self) -> i64 {
        match self {
            Unit::Second => 1,
            Unit::Minute => 60,
            Unit::Hour => 3_600,
            Unit::Day => 86_400,
            Unit::Week => 604_800,
            _ => 0,
        }
    }
}

/// One `amount unit` term of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub amount: u32,
    pub unit: Unit,
}

/// Resolve `expression` (including its leading `@`) relative to `now`.
pub fn resolve_keyword(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, KeywordError> {
    let body = expression
        .strip_prefix('@')
        .ok_or(KeywordError::NotAKeyword)?
        .to_lowercase();
    let words: Vec<&str> = body.split('-').filter(|w| !w.is_empty()).collect();

    match words.as_slice() {
        [] => Err(KeywordError::NoLiteral { found: None }),
        [word] if is_anchor(word) => anchor(word, now),
        [word] => Err(KeywordError::UnknownAnchor(word.to_string())),
        [direction, rest @ ..] if direction_sign(direction).is_some() => {
            let sign = direction_sign(direction).unwrap_or(1);
            let (shift, rest) = match rest {
                [unit] => (
                    Shift {
                        amount: 1,
                        unit: parse_unit(unit)?,
                    },
                    &rest[1..],
                ),
                _ => read_shift(rest)?,
            };
            if let Some(extra) = rest.first() {
                return Err(KeywordError::Unexpected(extra.to_string()));
            }
            apply(now, &[shift], sign)
        }
        _ => resolve_shifts(&words, now),
    }
}

fn resolve_shifts(words: &[&str], now: DateTime<Utc>) -> Result<DateTime<Utc>, KeywordError> {
    let mut shifts = Vec::new();
    let mut rest = words;

    loop {
        let (shift, after) = read_shift(rest)?;
        shifts.push(shift);
        match after {
            ["and", tail @ ..] => rest = tail,
            ["ago"] => return apply(now, &shifts, -1),
            ["later"] => return apply(now, &shifts, 1),
            ["from"] => return apply(now, &shifts, 1),
            ["from", base] => return apply(anchor(base, now)?, &shifts, 1),
            ["to" | "till"] => return apply(now, &shifts, -1),
            ["to" | "till", base] => return apply(anchor(base, now)?, &shifts, -1),
            [] => return Err(KeywordError::MissingDirection),
            [word, ..] if !is_suffix(word) => {
                return Err(KeywordError::Unexpected(word.to_string()));
            }
            _ => {
                let extra = after.last().map(|w| w.to_string()).unwrap_or_default();
                return Err(KeywordError::Unexpected(extra));
            }
        }
    }
}

fn read_shift<'a, 'b>(words: &'a [&'b str]) -> Result<(Shift, &'a [&'b str]), KeywordError> {
    let Some((amount, rest)) = words.split_first() else {
        return Err(KeywordError::NoLiteral { found: None });
    };
    let amount = match *amount {
        "a" | "an" => 1,
        digits => digits.parse::<u32>().map_err(|_| KeywordError::NoLiteral {
            found: Some(digits.to_string()),
        })?,
    };
    let Some((unit, rest)) = rest.split_first() else {
        return Err(KeywordError::InvalidUnit(String::new()));
    };
    Ok((
        Shift {
            amount,
            unit: parse_unit(unit)?,
        },
        rest,
    ))
}

fn parse_unit(word: &str) -> Result<Unit, KeywordError> {
    Unit::parse(word).ok_or_else(|| KeywordError::InvalidUnit(word.to_string()))
}

fn is_anchor(word: &str) -> bool {
    matches!(word, "now" | "today" | "yesterday" | "tomorrow")
}

fn is_suffix(word: &str) -> bool {
    matches!(word, "ago" | "later" | "from" | "to" | "till")
}

fn direction_sign(word: &str) -> Option<i32> {
    match word {
        "next" => Some(1),
        "last" | "prev" | "previous" => Some(-1),
        _ => None,
    }
}

fn anchor(word: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, KeywordError> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let day = TimeDelta::days(1);
    match word {
        "now" => Ok(now),
        "today" => Ok(midnight),
        "yesterday" => midnight.checked_sub_signed(day).ok_or(KeywordError::OutOfRange),
        "tomorrow" => midnight.checked_add_signed(day).ok_or(KeywordError::OutOfRange),
        other => Err(KeywordError::UnknownAnchor(other.to_string())),
    }
}

fn apply(base: DateTime<Utc>, shifts: &[Shift], sign: i32) -> Result<DateTime<Utc>, KeywordError> {
    shifts.iter().try_fold(base, |at, shift| {
        let shifted = match shift.unit.months() {
            Some(per_unit) => {
                let months = Months::new(shift.amount.checked_mul(per_unit).ok_or(KeywordError::OutOfRange)?);
                if sign < 0 {
                    at.checked_sub_months(months)
                } else {
                    at.checked_add_months(months)
                }
            }
            None => {
                let seconds = i64::from(shift.amount) * shift.unit.seconds() * i64::from(sign);
                TimeDelta::try_seconds(seconds).and_then(|delta| at.checked_add_signed(delta))
            }
        };
        shifted.ok_or(KeywordError::OutOfRange)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_units_accept_plural() {
        for (word, unit) in [("day", Unit::Day), ("centuries", Unit::Century), ("millennia", Unit::Millennium)] {
            assert_eq!(Unit::parse(word), Some(unit), "Failed for input: {}", word);
        }
    }

    #[test]
    fn test_article_amount() {
        assert_eq!(
            resolve_keyword("@a-day-ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 14, 10, 30, 0).unwrap()
        );
    }
}
