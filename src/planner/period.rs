//! Calendar period planning
//!
//! Splits an inclusive `[start, end]` date range into consecutive,
//! non-overlapping segments of `multiple` units each. All arithmetic is
//! plain proleptic-Gregorian date math on `NaiveDate`; no timezone or
//! locale is involved, so identical inputs always produce identical
//! segment boundaries.

use chrono::{Days, Months, NaiveDate};
use std::str::FromStr;

use crate::planner::{PlannerError, Segment, DATE_FORMAT};

/// Calendar unit for period decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    /// One calendar day
    Day,
    /// Seven days
    Week,
    /// One calendar month (day-of-month clamped at month end)
    Month,
    /// Three calendar months
    Quarter,
    /// Twelve calendar months
    Year,
}

impl std::fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
            PeriodUnit::Quarter => "quarter",
            PeriodUnit::Year => "year",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PeriodUnit {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(PeriodUnit::Day),
            "week" => Ok(PeriodUnit::Week),
            "month" => Ok(PeriodUnit::Month),
            "quarter" => Ok(PeriodUnit::Quarter),
            "year" => Ok(PeriodUnit::Year),
            _ => Err(PlannerError::InvalidUnit(s.to_string())),
        }
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(input: &str) -> Result<NaiveDate, PlannerError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| PlannerError::InvalidDate {
        input: input.to_string(),
    })
}

/// Advance a date by `multiple` units.
fn advance(date: NaiveDate, unit: PeriodUnit, multiple: u32) -> Option<NaiveDate> {
    match unit {
        PeriodUnit::Day => date.checked_add_days(Days::new(u64::from(multiple))),
        PeriodUnit::Week => date.checked_add_days(Days::new(7 * u64::from(multiple))),
        PeriodUnit::Month => date.checked_add_months(Months::new(multiple)),
        PeriodUnit::Quarter => date.checked_add_months(Months::new(3 * multiple)),
        PeriodUnit::Year => date.checked_add_months(Months::new(12 * multiple)),
    }
}

/// Plan consecutive date segments covering `[start, end]` inclusively.
///
/// Segment `i` spans `[current, min(current + multiple * unit - 1 day, end)]`
/// and the next segment starts at `current + multiple * unit`; planning
/// stops once `current > end`. A start past the end yields no segments.
///
/// # Errors
/// Rejects malformed dates and a zero multiple before producing anything.
pub fn period_segments(
    start: &str,
    end: &str,
    unit: PeriodUnit,
    multiple: u32,
) -> Result<Vec<Segment>, PlannerError> {
    if multiple == 0 {
        return Err(PlannerError::InvalidMultiple(multiple));
    }

    let start = parse_date(start)?;
    let end = parse_date(end)?;

    let mut segments = Vec::new();
    let mut current = start;

    while current <= end {
        let next = advance(current, unit, multiple).ok_or_else(|| PlannerError::InvalidDate {
            input: current.format(DATE_FORMAT).to_string(),
        })?;
        let segment_end = next
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| PlannerError::InvalidDate {
                input: next.format(DATE_FORMAT).to_string(),
            })?
            .min(end);

        segments.push(Segment::Period {
            start_date: current,
            end_date: segment_end,
        });
        current = next;
    }

    Ok(segments)
}
