//! Truncated dates and times, and how they widen into concrete instants.
//!
//! A partial value names a span rather than an instant: `2020` covers the
//! whole year. Which end of the span is meant depends on where the value is
//! used, so every conversion takes an explicit [`Bound`].

use std::fmt;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Which end of a partial value's span to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The first instant of the span (`2020` => `2020-01-01T00:00:00`)
    Start,
    /// The last instant of the span (`2020` => `2020-12-31T23:59:59.999999`)
    End,
}

/// `YYYY` or `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDate {
    pub year: i32,
    pub month: Option<u32>,
}

/// `HH` or `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialTime {
    pub hour: u32,
    pub minute: Option<u32>,
}

/// A timestamp truncated anywhere after the year.
///
/// Later components are only present when every earlier one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDateTime {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl PartialDate {
    pub fn new(year: i32, month: Option<u32>) -> Option<Self> {
        let partial = PartialDate { year, month };
        partial.resolve(Bound::Start)?;
        Some(partial)
    }

    pub fn resolve(&self, bound: Bound) -> Option<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), 1)?;
        match bound {
            Bound::Start => Some(first),
            Bound::End => {
                let span = if self.month.is_some() { 1 } else { 12 };
                first.checked_add_months(Months::new(span))?.pred_opt()
            }
        }
    }
}

impl PartialTime {
    pub fn new(hour: u32, minute: Option<u32>) -> Option<Self> {
        let partial = PartialTime { hour, minute };
        partial.resolve(Bound::Start)?;
        Some(partial)
    }

    pub fn resolve(&self, bound: Bound) -> Option<NaiveTime> {
        match (bound, self.minute) {
            (Bound::Start, minute) => NaiveTime::from_hms_opt(self.hour, minute.unwrap_or(0), 0),
            (Bound::End, Some(minute)) => {
                NaiveTime::from_hms_micro_opt(self.hour, minute, 59, 999_999)
            }
            (Bound::End, None) => NaiveTime::from_hms_micro_opt(self.hour, 59, 59, 999_999),
        }
    }
}

impl PartialDateTime {
    pub fn new(
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
        hour: Option<u32>,
        minute: Option<u32>,
    ) -> Option<Self> {
        let ordered = (month.is_some() || day.is_none())
            && (day.is_some() || hour.is_none())
            && (hour.is_some() || minute.is_none());
        if !ordered {
            return None;
        }
        let partial = PartialDateTime {
            year,
            month,
            day,
            hour,
            minute,
        };
        partial.resolve(Bound::Start)?;
        Some(partial)
    }

    pub fn resolve(&self, bound: Bound) -> Option<NaiveDateTime> {
        let date = match self.day {
            Some(day) => NaiveDate::from_ymd_opt(self.year, self.month?, day)?,
            None => PartialDate {
                year: self.year,
                month: self.month,
            }
            .resolve(bound)?,
        };
        let time = match self.hour {
            Some(hour) => PartialTime {
                hour,
                minute: self.minute,
            }
            .resolve(bound)?,
            None => match bound {
                Bound::Start => NaiveTime::MIN,
                Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?,
            },
        };
        Some(date.and_time(time))
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        Ok(())
    }
}

impl fmt::Display for PartialTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.hour)?;
        if let Some(minute) = self.minute {
            write!(f, ":{:02}", minute)?;
        }
        Ok(())
    }
}

impl fmt::Display for PartialDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        if let Some(hour) = self.hour {
            write!(f, "T{:02}", hour)?;
        }
        if let Some(minute) = self.minute {
            write!(f, ":{:02}", minute)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_february_end_in_leap_year() {
        let feb = PartialDate::new(2024, Some(2)).unwrap();
        assert_eq!(
            feb.resolve(Bound::End),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_out_of_order_components_rejected() {
        assert!(PartialDateTime::new(2020, None, Some(3), None, None).is_none());
        assert!(PartialDate::new(2020, Some(13)).is_none());
        assert!(PartialTime::new(24, None).is_none());
    }
}
