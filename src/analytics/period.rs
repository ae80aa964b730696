//! Period kinds and coarse date-range resolution.
//!
//! `resolve` snaps an anchor date to the half-open reporting range of its
//! containing day, month, quarter or year. Week ranges are not produced
//! here: weeks only exist as sliding-window lengths (see
//! [`super::best_window`]) where they are Monday-aligned.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AnalyticsError;

const MONTHS_IN_QUARTER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodKind {
    /// Periods accepted by [`resolve`].
    pub const COARSE: [PeriodKind; 4] = [
        PeriodKind::Day,
        PeriodKind::Month,
        PeriodKind::Quarter,
        PeriodKind::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "DAY",
            PeriodKind::Week => "WEEK",
            PeriodKind::Month => "MONTH",
            PeriodKind::Quarter => "QUARTER",
            PeriodKind::Year => "YEAR",
        }
    }

    /// Parse a coarse period token such as `"month"`; anything else, `WEEK`
    /// included, is an `InvalidPeriod`.
    pub fn parse_coarse(token: &str) -> Result<Self, AnalyticsError> {
        match token.parse::<PeriodKind>() {
            Ok(kind) if Self::COARSE.contains(&kind) => Ok(kind),
            _ => Err(invalid_period(token)),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(PeriodKind::Day),
            "WEEK" => Ok(PeriodKind::Week),
            "MONTH" => Ok(PeriodKind::Month),
            "QUARTER" => Ok(PeriodKind::Quarter),
            "YEAR" => Ok(PeriodKind::Year),
            _ => Err(invalid_period(s)),
        }
    }
}

fn invalid_period(token: &str) -> AnalyticsError {
    let allowed: Vec<&str> = PeriodKind::COARSE.iter().map(PeriodKind::as_str).collect();
    AnalyticsError::InvalidPeriod {
        period: token.trim().to_string(),
        allowed: allowed.join(", "),
    }
}

/// Half-open timestamp range `[start, end)`; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    fn between_days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start_of_day(start),
            end: start_of_day(end),
        }
    }

    /// Every timestamp of the calendar days `first..=last`.
    pub fn from_days_inclusive(first: NaiveDate, last: NaiveDate) -> Result<Self, AnalyticsError> {
        let after_last = last.succ_opt().ok_or(AnalyticsError::DateOutOfRange(last))?;
        Ok(Self::between_days(first, after_last))
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

pub(crate) fn first_of_month(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).ok_or(AnalyticsError::DateOutOfRange(date))
}

pub(crate) fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, AnalyticsError> {
    date.checked_add_months(Months::new(months))
        .ok_or(AnalyticsError::DateOutOfRange(date))
}

/// Resolve the reporting range of `period` containing `anchor`.
pub fn resolve(anchor: NaiveDate, period: PeriodKind) -> Result<DateRange, AnalyticsError> {
    let (start, end) = match period {
        PeriodKind::Day => {
            let next = anchor.succ_opt().ok_or(AnalyticsError::DateOutOfRange(anchor))?;
            (anchor, next)
        }
        PeriodKind::Month => {
            let start = first_of_month(anchor)?;
            (start, add_months(start, 1)?)
        }
        PeriodKind::Quarter => {
            let quarter = anchor.month0() / MONTHS_IN_QUARTER;
            let start = NaiveDate::from_ymd_opt(anchor.year(), quarter * MONTHS_IN_QUARTER + 1, 1)
                .ok_or(AnalyticsError::DateOutOfRange(anchor))?;
            (start, add_months(start, MONTHS_IN_QUARTER)?)
        }
        PeriodKind::Year => {
            let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1)
                .ok_or(AnalyticsError::DateOutOfRange(anchor))?;
            let end = NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1)
                .ok_or(AnalyticsError::DateOutOfRange(anchor))?;
            (start, end)
        }
        PeriodKind::Week => return Err(invalid_period(period.as_str())),
    };

    Ok(DateRange::between_days(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        start_of_day(date(y, m, d))
    }

    #[test]
    fn test_day_range() {
        let range = resolve(date(2024, 1, 1), PeriodKind::Day).unwrap();
        assert_eq!(range.start, midnight(2024, 1, 1));
        assert_eq!(range.end, midnight(2024, 1, 2));
    }

    #[test]
    fn test_day_range_crosses_year_end() {
        let range = resolve(date(2023, 12, 31), PeriodKind::Day).unwrap();
        assert_eq!(range.end, midnight(2024, 1, 1));
    }

    #[test]
    fn test_month_range_leap_february() {
        let range = resolve(date(2024, 2, 29), PeriodKind::Month).unwrap();
        assert_eq!(range.start, midnight(2024, 2, 1));
        assert_eq!(range.end, midnight(2024, 3, 1));
        assert!(range.contains(midnight(2024, 2, 29)));
    }

    #[test]
    fn test_month_range_december() {
        let range = resolve(date(2023, 12, 15), PeriodKind::Month).unwrap();
        assert_eq!(range.start, midnight(2023, 12, 1));
        assert_eq!(range.end, midnight(2024, 1, 1));
    }

    #[test]
    fn test_quarter_ranges() {
        let q1 = resolve(date(2024, 2, 15), PeriodKind::Quarter).unwrap();
        assert_eq!(q1.start, midnight(2024, 1, 1));
        assert_eq!(q1.end, midnight(2024, 4, 1));

        let q3 = resolve(date(2024, 9, 30), PeriodKind::Quarter).unwrap();
        assert_eq!(q3.start, midnight(2024, 7, 1));
        assert_eq!(q3.end, midnight(2024, 10, 1));

        let q4 = resolve(date(2024, 10, 1), PeriodKind::Quarter).unwrap();
        assert_eq!(q4.start, midnight(2024, 10, 1));
        assert_eq!(q4.end, midnight(2025, 1, 1));
    }

    #[test]
    fn test_year_range() {
        let range = resolve(date(2024, 7, 4), PeriodKind::Year).unwrap();
        assert_eq!(range.start, midnight(2024, 1, 1));
        assert_eq!(range.end, midnight(2025, 1, 1));
    }

    #[test]
    fn test_week_is_not_a_coarse_period() {
        let err = resolve(date(2024, 1, 1), PeriodKind::Week).unwrap_err();
        match err {
            AnalyticsError::InvalidPeriod { period, allowed } => {
                assert_eq!(period, "WEEK");
                assert_eq!(allowed, "DAY, MONTH, QUARTER, YEAR");
            }
            other => panic!("expected InvalidPeriod, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_coarse() {
        assert_eq!(PeriodKind::parse_coarse("day").unwrap(), PeriodKind::Day);
        assert_eq!(PeriodKind::parse_coarse("Quarter").unwrap(), PeriodKind::Quarter);
        assert!(PeriodKind::parse_coarse("week").is_err());
        assert!(PeriodKind::parse_coarse("fortnight").is_err());
    }

    #[test]
    fn test_invalid_period_message_lists_allowed() {
        let err = PeriodKind::parse_coarse("decade").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid period 'decade'. Allowed periods: (DAY, MONTH, QUARTER, YEAR)"
        );
    }

    #[test]
    fn test_inclusive_days_range() {
        let range = DateRange::from_days_inclusive(date(2024, 1, 1), date(2024, 2, 28)).unwrap();
        assert_eq!(range.start, midnight(2024, 1, 1));
        assert_eq!(range.end, midnight(2024, 2, 29));
    }

    #[test]
    fn test_max_date_is_out_of_range() {
        assert!(matches!(
            resolve(NaiveDate::MAX, PeriodKind::Day),
            Err(AnalyticsError::DateOutOfRange(_))
        ));
    }

    proptest! {
        #[test]
        fn day_ranges_are_contiguous(offset in 0i64..200_000) {
            let day = date(1970, 1, 1) + chrono::Duration::days(offset);
            let today = resolve(day, PeriodKind::Day).unwrap();
            let tomorrow = resolve(day.succ_opt().unwrap(), PeriodKind::Day).unwrap();
            prop_assert_eq!(today.end, tomorrow.start);
        }

        #[test]
        fn month_ranges_span_first_to_first(offset in 0i64..200_000) {
            let day = date(1970, 1, 1) + chrono::Duration::days(offset);
            let range = resolve(day, PeriodKind::Month).unwrap();
            let start = range.start.date();
            let end = range.end.date();

            prop_assert_eq!(start.day(), 1);
            prop_assert_eq!(end.day(), 1);
            prop_assert!(range.contains(start_of_day(day)));

            let length = (end - start).num_days();
            prop_assert!((28..=31).contains(&length));
        }
    }
}
