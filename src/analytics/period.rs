use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar dates.
///
/// Only the date is significant; an inverted range matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// Sunday through Saturday of the week containing `day`.
    pub fn week_of(day: NaiveDate) -> Self {
        let back = u64::from(day.weekday().num_days_from_sunday());
        let start = day - Days::new(back);
        Self::new(start, start + Days::new(6))
    }

    /// January 1st through December 31st of the year containing `day`.
    pub fn year_of(day: NaiveDate) -> Self {
        let start = day - Days::new(u64::from(day.ordinal0()));
        let end = NaiveDate::from_ymd_opt(day.year(), 12, 31).unwrap_or(day);
        Self::new(start, end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|ts| ts.with_timezone(&Utc).date_naive())
    })
}
