//! Report window selection.
//!
//! The report always ends yesterday. Monday runs reach back a full week so
//! attendance entered over the weekend is picked up.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, Weekday};

/// Date format the report form's text inputs expect.
const FORM_DATE: &[FormatItem<'static>] = format_description!("[month]/[day]/[year]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn for_run_date(run_date: Date) -> Self {
        let lookback = if run_date.weekday() == Weekday::Monday {
            7
        } else {
            1
        };
        Self {
            start: run_date - Duration::days(lookback),
            end: run_date - Duration::days(1),
        }
    }

    /// Start and end rendered as `MM/DD/YYYY`.
    pub fn form_values(&self) -> Result<(String, String), time::error::Format> {
        Ok((self.start.format(FORM_DATE)?, self.end.format(FORM_DATE)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn monday_reaches_back_one_week() {
        let range = DateRange::for_run_date(date!(2025 - 12 - 15));
        assert_eq!(range.start, date!(2025 - 12 - 08));
        assert_eq!(range.end, date!(2025 - 12 - 14));
    }

    #[test]
    fn midweek_covers_yesterday_only() {
        let range = DateRange::for_run_date(date!(2025 - 12 - 17));
        assert_eq!(range.start, date!(2025 - 12 - 16));
        assert_eq!(range.end, date!(2025 - 12 - 16));
    }

    #[test]
    fn every_day_of_a_year_ends_before_the_run_date() {
        let mut day = date!(2024 - 01 - 01);
        while day < date!(2025 - 01 - 01) {
            let range = DateRange::for_run_date(day);
            assert!(range.end < day, "{day}: end {} not before run", range.end);
            assert!(range.start <= range.end, "{day}: start after end");
            assert_eq!(range.end, day.previous_day().unwrap());
            if day.weekday() == Weekday::Monday {
                assert_eq!(range.start, day - Duration::days(7));
            } else {
                assert_eq!(range.start, range.end);
            }
            day = day.next_day().unwrap();
        }
    }

    #[test]
    fn range_crossing_a_year_boundary() {
        // 2024-01-01 was a Monday.
        let range = DateRange::for_run_date(date!(2024 - 01 - 01));
        assert_eq!(range.start, date!(2023 - 12 - 25));
        assert_eq!(range.end, date!(2023 - 12 - 31));
    }

    #[test]
    fn form_values_use_us_month_day_year() {
        let range = DateRange::for_run_date(date!(2025 - 12 - 15));
        let (start, end) = range.form_values().unwrap();
        assert_eq!(start, "12/08/2025");
        assert_eq!(end, "12/14/2025");
    }
}
