//! Date range resolution.
//!
//! The two date pickers are the only user inputs. Both bounds are inclusive
//! and compared against the calendar date of each event's block timestamp.
//! A reversed range is accepted as-is and simply matches nothing.

use std::fmt;

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        if start > end {
            warn!(
                "Date range start {} is after end {}, every query will come back empty",
                start, end
            );
        }
        Self { start, end }
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> anyhow::Result<Self> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    /// Resolve optional request parameters, falling back to `defaults` for
    /// whichever bound is missing or blank.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        defaults: &DateRange,
    ) -> anyhow::Result<Self> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s)?,
            None => defaults.start,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s)?,
            None => defaults.end,
        };
        Ok(Self::new(start, end))
    }

    /// Lower bound formatted for the range predicate.
    pub fn start_bound(&self) -> String {
        self.start.to_string()
    }

    /// Upper bound formatted for the range predicate.
    pub fn end_bound(&self) -> String {
        self.end.to_string()
    }

    pub fn bounds(&self) -> (String, String) {
        (self.start_bound(), self.end_bound())
    }

    /// True when start is after end.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> anyhow::Result<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_bounds_are_iso_dates() {
        let range = DateRange::parse("2022-01-01", "2025-06-01").unwrap();
        assert_eq!(
            range.bounds(),
            ("2022-01-01".to_string(), "2025-06-01".to_string())
        );
    }

    #[test]
    fn test_reversed_range_is_accepted_but_empty() {
        let range = DateRange::parse("2024-02-01", "2024-01-01").unwrap();
        assert!(range.is_empty());
        assert!(!range.contains(date!(2024 - 01 - 15)));
    }

    #[test]
    fn test_single_day_range_contains_that_day() {
        let range = DateRange::new(date!(2022 - 01 - 08), date!(2022 - 01 - 08));
        assert!(!range.is_empty());
        assert!(range.contains(date!(2022 - 01 - 08)));
        assert!(!range.contains(date!(2022 - 01 - 09)));
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let defaults = DateRange::new(date!(2022 - 01 - 01), date!(2025 - 06 - 01));

        let range = DateRange::resolve(None, Some("2023-03-04"), &defaults).unwrap();
        assert_eq!(range.start, date!(2022 - 01 - 01));
        assert_eq!(range.end, date!(2023 - 03 - 04));

        let range = DateRange::resolve(Some("  "), None, &defaults).unwrap();
        assert_eq!(range, defaults);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        assert!(DateRange::parse("2022/01/01", "2022-02-01").is_err());
        assert!(DateRange::parse("2022-01-01", "2022-02-30").is_err());
    }
}
